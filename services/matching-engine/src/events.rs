//! Event structures for matching engine
//!
//! One event per execution report. The driver turns fills into an EXE line
//! followed by an ACC line, and rejections into a REJ line.

use serde::{Deserialize, Serialize};
use types::account::Account;
use types::execution::Execution;
use types::ids::OrderId;
use types::order::Regime;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// An order filled; `account` is the state after the fill
    Fill {
        order_id: OrderId,
        regime: Regime,
        execution: Execution,
        account: Account,
    },
    /// An order expired without a match
    Rejection {
        order_id: OrderId,
        regime: Regime,
        execution: Execution,
    },
}

impl EngineEvent {
    pub fn execution(&self) -> &Execution {
        match self {
            EngineEvent::Fill { execution, .. } | EngineEvent::Rejection { execution, .. } => {
                execution
            }
        }
    }

    pub fn account(&self) -> Option<&Account> {
        match self {
            EngineEvent::Fill { account, .. } => Some(account),
            EngineEvent::Rejection { .. } => None,
        }
    }

    pub fn is_fill(&self) -> bool {
        matches!(self, EngineEvent::Fill { .. })
    }
}
