use thiserror::Error;

use crate::status::DocumentStatus;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("illegal status transition: {from} -> {to}")]
    IllegalTransition {
        from: DocumentStatus,
        to: DocumentStatus,
    },
}
