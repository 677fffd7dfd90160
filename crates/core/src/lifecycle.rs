//! Status enums and their allowed transitions.
//!
//! Statuses are stored as SMALLINT ids; each enum's discriminant matches the
//! id used by the migrations. Handlers call [`ensure_transition`] before
//! writing a new status so an illegal move becomes a business-rule error.

use crate::error::CoreError;

/// Status id type matching SMALLINT in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident = $val:literal => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $variant = $val ),+
        }

        impl $name {
            /// Every variant in id order.
            pub const ALL: &'static [$name] = &[$( $name::$variant ),+];

            /// Return the database status id.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up a variant by database id.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// The snake_case name used in query strings and request bodies.
            pub fn name(self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )+
                }
            }

            /// Parse a snake_case name (case-insensitive).
            pub fn from_name(name: &str) -> Option<Self> {
                let name = name.trim();
                $(
                    if name.eq_ignore_ascii_case($label) {
                        return Some($name::$variant);
                    }
                )+
                None
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl TryFrom<StatusId> for $name {
            type Error = UnknownStatusId;

            fn try_from(id: StatusId) -> Result<Self, Self::Error> {
                $name::from_id(id).ok_or(UnknownStatusId {
                    kind: stringify!($name),
                    id,
                })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.name())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                $name::from_name(&raw).ok_or_else(|| {
                    serde::de::Error::custom(format!("unknown {} '{raw}'", stringify!($name)))
                })
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

/// A SMALLINT read from the database that matches no variant.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind} id {id}")]
pub struct UnknownStatusId {
    pub kind: &'static str,
    pub id: StatusId,
}

/// A status enum with a transition table.
pub trait Lifecycle: Copy + std::fmt::Display {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    fn can_transition_to(self, next: Self) -> bool;
}

/// Fail with [`CoreError::BusinessRule`] unless `from -> to` is allowed.
pub fn ensure_transition<S: Lifecycle>(from: S, to: S) -> Result<(), CoreError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::BusinessRule(format!(
            "{} cannot move from '{from}' to '{to}'",
            S::ENTITY
        )))
    }
}

define_status_enum! {
    /// Employment status.
    EmployeeStatus {
        Active = 1 => "active",
        OnLeave = 2 => "on_leave",
        Terminated = 3 => "terminated",
    }
}

impl Lifecycle for EmployeeStatus {
    const ENTITY: &'static str = "Employee";

    fn can_transition_to(self, next: Self) -> bool {
        use EmployeeStatus::*;
        matches!(
            (self, next),
            (Active, OnLeave) | (OnLeave, Active) | (Active, Terminated) | (OnLeave, Terminated)
        )
    }
}

define_status_enum! {
    /// Contract lifecycle status.
    ContractStatus {
        Draft = 1 => "draft",
        Active = 2 => "active",
        Expired = 3 => "expired",
        Terminated = 4 => "terminated",
    }
}

impl Lifecycle for ContractStatus {
    const ENTITY: &'static str = "Contract";

    fn can_transition_to(self, next: Self) -> bool {
        use ContractStatus::*;
        matches!(
            (self, next),
            (Draft, Active) | (Draft, Terminated) | (Active, Expired) | (Active, Terminated)
        )
    }
}

define_status_enum! {
    /// Direction of a financial transaction.
    TransactionKind {
        Payable = 1 => "payable",
        Receivable = 2 => "receivable",
    }
}

define_status_enum! {
    /// Accounts payable/receivable transaction status.
    TransactionStatus {
        Pending = 1 => "pending",
        Paid = 2 => "paid",
        Cancelled = 3 => "cancelled",
    }
}

impl Lifecycle for TransactionStatus {
    const ENTITY: &'static str = "Transaction";

    fn can_transition_to(self, next: Self) -> bool {
        use TransactionStatus::*;
        matches!((self, next), (Pending, Paid) | (Pending, Cancelled))
    }
}

define_status_enum! {
    /// Purchase order lifecycle status.
    PurchaseOrderStatus {
        Draft = 1 => "draft",
        Submitted = 2 => "submitted",
        Approved = 3 => "approved",
        Received = 4 => "received",
        Cancelled = 5 => "cancelled",
    }
}

impl Lifecycle for PurchaseOrderStatus {
    const ENTITY: &'static str = "Purchase order";

    fn can_transition_to(self, next: Self) -> bool {
        use PurchaseOrderStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted)
                | (Submitted, Approved)
                | (Approved, Received)
                | (Draft, Cancelled)
                | (Submitted, Cancelled)
                | (Approved, Cancelled)
        )
    }
}

define_status_enum! {
    /// Payroll record status.
    PayrollStatus {
        Draft = 1 => "draft",
        Approved = 2 => "approved",
        Paid = 3 => "paid",
    }
}

impl Lifecycle for PayrollStatus {
    const ENTITY: &'static str = "Payroll";

    fn can_transition_to(self, next: Self) -> bool {
        use PayrollStatus::*;
        matches!((self, next), (Draft, Approved) | (Approved, Paid))
    }
}

define_status_enum! {
    /// Task workflow status.
    TaskStatus {
        Todo = 1 => "todo",
        InProgress = 2 => "in_progress",
        Done = 3 => "done",
        Cancelled = 4 => "cancelled",
    }
}

impl Lifecycle for TaskStatus {
    const ENTITY: &'static str = "Task";

    fn can_transition_to(self, next: Self) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Todo, InProgress)
                | (InProgress, Todo)
                | (Todo, Done)
                | (InProgress, Done)
                | (Todo, Cancelled)
                | (InProgress, Cancelled)
                | (Done, InProgress)
        )
    }
}

define_status_enum! {
    /// Task priority (not a lifecycle; shares the id/name mapping).
    TaskPriority {
        Low = 1 => "low",
        Medium = 2 => "medium",
        High = 3 => "high",
        Urgent = 4 => "urgent",
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn ids_and_names_round_trip() {
        for status in TaskStatus::ALL {
            assert_eq!(TaskStatus::from_id(status.id()), Some(*status));
            assert_eq!(TaskStatus::from_name(status.name()), Some(*status));
        }
        assert_eq!(TaskStatus::from_id(0), None);
        assert_eq!(TaskStatus::from_name("IN_PROGRESS"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::from_name("later"), None);
    }

    #[test]
    fn statuses_serialize_by_name() {
        let json = serde_json::to_string(&ContractStatus::Active).unwrap();
        assert_eq!(json, "\"active\"");
        let parsed: TaskPriority = serde_json::from_str("\"urgent\"").unwrap();
        assert_eq!(parsed, TaskPriority::Urgent);
        assert!(serde_json::from_str::<TaskPriority>("\"someday\"").is_err());
    }

    #[test]
    fn unknown_database_id_is_an_error() {
        assert_matches!(EmployeeStatus::try_from(2), Ok(EmployeeStatus::OnLeave));
        let err = EmployeeStatus::try_from(9).unwrap_err();
        assert_eq!(err.to_string(), "unknown EmployeeStatus id 9");
    }

    #[test]
    fn purchase_order_happy_path() {
        use PurchaseOrderStatus::*;
        assert!(ensure_transition(Draft, Submitted).is_ok());
        assert!(ensure_transition(Submitted, Approved).is_ok());
        assert!(ensure_transition(Approved, Received).is_ok());
    }

    #[test]
    fn purchase_order_cannot_skip_or_leave_terminal_states() {
        use PurchaseOrderStatus::*;
        assert!(!Draft.can_transition_to(Approved));
        assert!(!Draft.can_transition_to(Received));
        assert!(!Received.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Draft));
    }

    #[test]
    fn transaction_transitions() {
        use TransactionStatus::*;
        assert!(Pending.can_transition_to(Paid));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Paid.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Paid));
    }

    #[test]
    fn payroll_must_be_approved_before_paid() {
        use PayrollStatus::*;
        assert!(!Draft.can_transition_to(Paid));
        assert!(Draft.can_transition_to(Approved));
        assert!(Approved.can_transition_to(Paid));
        assert!(!Paid.can_transition_to(Draft));
    }

    #[test]
    fn task_can_be_reopened_but_not_uncancelled() {
        use TaskStatus::*;
        assert!(Done.can_transition_to(InProgress));
        assert!(!Done.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Todo));
        assert!(Todo.can_transition_to(Done));
    }

    #[test]
    fn contract_and_employee_terminal_states() {
        assert!(!ContractStatus::Expired.can_transition_to(ContractStatus::Active));
        assert!(ContractStatus::Draft.can_transition_to(ContractStatus::Terminated));
        assert!(!EmployeeStatus::Terminated.can_transition_to(EmployeeStatus::Active));
        assert!(EmployeeStatus::OnLeave.can_transition_to(EmployeeStatus::Active));
    }

    #[test]
    fn rejected_transition_is_business_rule_error() {
        let err = ensure_transition(PayrollStatus::Paid, PayrollStatus::Draft).unwrap_err();
        assert_matches!(err, CoreError::BusinessRule(msg) if msg == "Payroll cannot move from 'paid' to 'draft'");
    }
}
