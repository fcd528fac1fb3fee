use crate::action::{Action, Applied};
use crate::composite::Composite;
use jtrans_errors::Error;
use jtrans_types::ActionType;

/// Copies the artifact unchanged
#[derive(Debug, Default)]
pub struct NullAction;

impl Action for NullAction {
    fn action_type(&self) -> ActionType {
        ActionType::Null
    }

    fn apply(&self, _composite: &Composite, _name: &str, _input: &[u8]) -> Result<Applied, Error> {
        Ok(Applied::unchanged())
    }
}
