//! Declarative authorization policy.
//!
//! Every entry point consults the same rule table instead of repeating
//! role checks per handler. A rule names the operation, the roles that
//! may perform it, and the ownership predicate applied to the target
//! form (when the operation has one). Ownership is only evaluated by
//! the services after the target record was confirmed to exist, so a
//! missing record surfaces as not-found rather than forbidden.

use serde::{Deserialize, Serialize};

use crate::accounts::AccountId;

/// The five access levels, ordered from narrowest to widest scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "aluno")]
    Student,
    #[serde(rename = "instrutor")]
    Instructor,
    #[serde(rename = "coordenador")]
    Coordinator,
    #[serde(rename = "gerente")]
    Manager,
    #[serde(rename = "administrador")]
    Administrator,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Student => "aluno",
            Role::Instructor => "instrutor",
            Role::Coordinator => "coordenador",
            Role::Manager => "gerente",
            Role::Administrator => "administrador",
        }
    }
}

/// Caller identity injected by the external session layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: AccountId,
    pub name: String,
    pub role: Role,
}

/// Every gated operation the service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListAccounts,
    ManageAccounts,
    ListForms,
    ReadForm,
    CreateForm,
    UpdateForm,
    DeleteForm,
    ReadAudit,
    ManageCatalog,
    CreateReport,
    ExportRecords,
    ImportRecords,
}

/// Ownership fields of an evaluation form relevant to the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormOwnership {
    pub evaluatee_id: AccountId,
    pub evaluator_id: AccountId,
}

/// Which subset of forms a caller may see when listing or exporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormScope {
    All,
    EvaluateeOf(AccountId),
    EvaluatorOf(AccountId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct PolicyDenial {
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OwnershipRule {
    /// Role membership alone decides.
    None,
    /// Students must be the evaluatee, instructors the evaluator.
    ViewScope,
    /// Instructors must be the evaluator; wider roles pass.
    EditScope,
}

struct Rule {
    operation: Operation,
    allowed: &'static [Role],
    ownership: OwnershipRule,
    denial: &'static str,
}

const ALL_ROLES: &[Role] = &[
    Role::Student,
    Role::Instructor,
    Role::Coordinator,
    Role::Manager,
    Role::Administrator,
];
const INSTRUCTOR_UP: &[Role] = &[
    Role::Instructor,
    Role::Coordinator,
    Role::Manager,
    Role::Administrator,
];
const COORDINATOR_UP: &[Role] = &[Role::Coordinator, Role::Manager, Role::Administrator];
const MANAGER_UP: &[Role] = &[Role::Manager, Role::Administrator];

const RULES: &[Rule] = &[
    Rule {
        operation: Operation::ListAccounts,
        allowed: MANAGER_UP,
        ownership: OwnershipRule::None,
        denial: "access restricted to managers and administrators",
    },
    Rule {
        operation: Operation::ManageAccounts,
        allowed: MANAGER_UP,
        ownership: OwnershipRule::None,
        denial: "access restricted to managers and administrators",
    },
    Rule {
        operation: Operation::ListForms,
        allowed: ALL_ROLES,
        ownership: OwnershipRule::None,
        denial: "access denied",
    },
    Rule {
        operation: Operation::ReadForm,
        allowed: ALL_ROLES,
        ownership: OwnershipRule::ViewScope,
        denial: "access denied",
    },
    Rule {
        operation: Operation::CreateForm,
        allowed: INSTRUCTOR_UP,
        ownership: OwnershipRule::None,
        denial: "access restricted to instructors and above",
    },
    Rule {
        operation: Operation::UpdateForm,
        allowed: INSTRUCTOR_UP,
        ownership: OwnershipRule::EditScope,
        denial: "access restricted to instructors and above",
    },
    Rule {
        operation: Operation::DeleteForm,
        allowed: COORDINATOR_UP,
        ownership: OwnershipRule::None,
        denial: "access restricted to coordinators and above",
    },
    Rule {
        operation: Operation::ReadAudit,
        allowed: INSTRUCTOR_UP,
        ownership: OwnershipRule::None,
        denial: "students may not read the change history",
    },
    Rule {
        operation: Operation::ManageCatalog,
        allowed: MANAGER_UP,
        ownership: OwnershipRule::None,
        denial: "access restricted to managers and administrators",
    },
    Rule {
        operation: Operation::CreateReport,
        allowed: COORDINATOR_UP,
        ownership: OwnershipRule::None,
        denial: "access restricted to coordinators and above",
    },
    Rule {
        operation: Operation::ExportRecords,
        allowed: ALL_ROLES,
        ownership: OwnershipRule::None,
        denial: "access denied",
    },
    Rule {
        operation: Operation::ImportRecords,
        allowed: MANAGER_UP,
        ownership: OwnershipRule::None,
        denial: "import restricted to managers and administrators",
    },
];

/// Decide whether `actor` may perform `operation`, optionally against
/// the ownership fields of an existing target form.
pub fn authorize(
    actor: &Actor,
    operation: Operation,
    target: Option<&FormOwnership>,
) -> Result<(), PolicyDenial> {
    let rule = RULES
        .iter()
        .find(|rule| rule.operation == operation)
        .expect("every operation has a policy rule");

    if !rule.allowed.contains(&actor.role) {
        return Err(PolicyDenial {
            reason: rule.denial.to_string(),
        });
    }

    let Some(ownership) = target else {
        return Ok(());
    };

    match rule.ownership {
        OwnershipRule::None => Ok(()),
        OwnershipRule::ViewScope => match actor.role {
            Role::Student if ownership.evaluatee_id != actor.id => Err(PolicyDenial {
                reason: "students may only access forms where they are the evaluatee".to_string(),
            }),
            Role::Instructor if ownership.evaluator_id != actor.id => Err(PolicyDenial {
                reason: "instructors may only access forms they evaluated".to_string(),
            }),
            _ => Ok(()),
        },
        OwnershipRule::EditScope => match actor.role {
            Role::Instructor if ownership.evaluator_id != actor.id => Err(PolicyDenial {
                reason: "instructors may only edit forms they evaluated".to_string(),
            }),
            _ => Ok(()),
        },
    }
}

/// The listing filter each role is confined to.
pub fn form_scope(actor: &Actor) -> FormScope {
    match actor.role {
        Role::Student => FormScope::EvaluateeOf(actor.id),
        Role::Instructor => FormScope::EvaluatorOf(actor.id),
        Role::Coordinator | Role::Manager | Role::Administrator => FormScope::All,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(id: i64, role: Role) -> Actor {
        Actor {
            id: AccountId(id),
            name: format!("actor-{id}"),
            role,
        }
    }

    fn ownership(evaluatee: i64, evaluator: i64) -> FormOwnership {
        FormOwnership {
            evaluatee_id: AccountId(evaluatee),
            evaluator_id: AccountId(evaluator),
        }
    }

    #[test]
    fn role_gates_match_the_matrix() {
        let cases: &[(Operation, &[Role])] = &[
            (Operation::ListAccounts, MANAGER_UP),
            (Operation::ManageAccounts, MANAGER_UP),
            (Operation::ListForms, ALL_ROLES),
            (Operation::CreateForm, INSTRUCTOR_UP),
            (Operation::DeleteForm, COORDINATOR_UP),
            (Operation::ReadAudit, INSTRUCTOR_UP),
            (Operation::ManageCatalog, MANAGER_UP),
            (Operation::CreateReport, COORDINATOR_UP),
            (Operation::ExportRecords, ALL_ROLES),
            (Operation::ImportRecords, MANAGER_UP),
        ];

        for (operation, allowed) in cases {
            for role in ALL_ROLES {
                let result = authorize(&actor(1, *role), *operation, None);
                assert_eq!(
                    result.is_ok(),
                    allowed.contains(role),
                    "{operation:?} as {role:?}"
                );
            }
        }
    }

    #[test]
    fn denials_carry_a_reason() {
        let err = authorize(&actor(1, Role::Student), Operation::ImportRecords, None)
            .expect_err("students may not import");
        assert!(err.reason.contains("managers"));
    }

    #[test]
    fn view_scope_restricts_students_to_their_own_forms() {
        let student = actor(7, Role::Student);
        assert!(authorize(&student, Operation::ReadForm, Some(&ownership(7, 2))).is_ok());
        let err = authorize(&student, Operation::ReadForm, Some(&ownership(8, 2)))
            .expect_err("not the evaluatee");
        assert!(err.reason.contains("evaluatee"));
    }

    #[test]
    fn view_scope_restricts_instructors_to_forms_they_evaluated() {
        let instructor = actor(3, Role::Instructor);
        assert!(authorize(&instructor, Operation::ReadForm, Some(&ownership(7, 3))).is_ok());
        assert!(authorize(&instructor, Operation::ReadForm, Some(&ownership(7, 4))).is_err());
    }

    #[test]
    fn edit_scope_lets_coordinators_edit_any_form() {
        let coordinator = actor(5, Role::Coordinator);
        assert!(authorize(&coordinator, Operation::UpdateForm, Some(&ownership(1, 2))).is_ok());

        let instructor = actor(5, Role::Instructor);
        assert!(authorize(&instructor, Operation::UpdateForm, Some(&ownership(1, 2))).is_err());
    }

    #[test]
    fn scopes_follow_roles() {
        assert_eq!(
            form_scope(&actor(9, Role::Student)),
            FormScope::EvaluateeOf(AccountId(9))
        );
        assert_eq!(
            form_scope(&actor(9, Role::Instructor)),
            FormScope::EvaluatorOf(AccountId(9))
        );
        assert_eq!(form_scope(&actor(9, Role::Manager)), FormScope::All);
    }
}
