use super::{ModalId, ModalState};

pub type Result<T> = std::result::Result<T, ModalError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModalError {
    /// Neither content nor a template id was supplied.
    #[error("modal requires either content or a template id")]
    MissingContent,

    /// The template id does not resolve in the host document.
    #[error("template `{0}` does not exist")]
    TemplateNotFound(String),

    /// The operation is not valid in the modal's current state.
    #[error("cannot {operation} modal {id} while it is {state:?}")]
    InvalidState {
        id: ModalId,
        state: ModalState,
        operation: &'static str,
    },
}
