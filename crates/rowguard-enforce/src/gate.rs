use rowguard_core::Action;
use rowguard_policy::{RuleCheck, TablePolicies};
use tracing::debug;

use crate::error::DenyCause;
use crate::session::{has_any_role, Session};

/// The gate's verdict, handed to the second pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyCause),
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// The capability gate: coarse allow/deny from identity and role alone.
///
/// Decision order:
/// 1. No effective rule for the action => permit (unrestricted; record
///    rules, if any, still narrow at the storage layer)
/// 2. `Public` => permit, authenticated or not
/// 3. Every other rule requires an identity: no session => deny
///    (owner/custom conditions cannot be evaluated without a principal)
/// 4. `Authenticated` => permit
/// 5. `AnyRole` => permit iff the session holds one of the listed roles
/// 6. `Predicate` (owner/custom) => permit; the row/field filter narrows
///
/// Never inspects row data, runs strictly before any storage access, and
/// the decision is never cached across principals.
pub fn authorize(
    policies: &TablePolicies,
    action: Action,
    session: Option<&dyn Session>,
) -> Decision {
    // Rule 1: unrestricted at the gate
    let check = match policies.gate_rule(action) {
        Some(check) => check,
        None => return Decision::Allow,
    };

    // Rule 2: public needs no identity
    if matches!(check, RuleCheck::Public) {
        return Decision::Allow;
    }

    // Rule 3: everything else does
    let session = match session {
        Some(s) => s,
        None => {
            debug!(table = %policies.name(), %action, "gate deny: no session");
            return Decision::Deny(DenyCause::NotAuthenticated);
        }
    };

    match check {
        RuleCheck::Public => Decision::Allow,
        // Rule 4
        RuleCheck::Authenticated => Decision::Allow,
        // Rule 5
        RuleCheck::AnyRole(roles) => {
            if has_any_role(session, roles) {
                Decision::Allow
            } else {
                debug!(table = %policies.name(), %action, "gate deny: missing role");
                Decision::Deny(DenyCause::MissingRole)
            }
        }
        // Rule 6: row-dependent, deferred to the storage filter
        RuleCheck::Predicate(_) => Decision::Allow,
    }
}
