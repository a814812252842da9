//! Inverse commands for reversible intents.
//!
//! Reversible: CREATE_FILE, CREATE_DIR, MOVE_FILE, RENAME_FILE, GIT_ADD.
//! Everything else, deletes and branch switches and resets included, has no
//! inverse and never lands on the rollback stack.

use crate::core::context::SystemContext;
use crate::core::intent::Intent;
use crate::core::step::Action;
use crate::plugins;

pub struct RollbackBuilder;

impl RollbackBuilder {
    /// Must be called before the forward command runs: a move's inverse
    /// depends on whether the destination was a directory beforehand.
    pub fn build(action: &Action, ctx: &SystemContext) -> Option<String> {
        let family = plugins::family_for(action);
        if !family.is_reversible(action.intent()) {
            return None;
        }
        family.rollback(action, ctx)
    }

    pub fn is_reversible(intent: Intent) -> bool {
        Action::empty(intent)
            .map(|action| plugins::family_for(&action).is_reversible(intent))
            .unwrap_or(false)
    }
}
