use std::sync::Arc;

use crate::{primitives::ProtocolVersion, wallet::CoreWallet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    State(Arc<CoreWallet>),
    /// `source_gap` is how far the applied id trails the feed. Applying and
    /// publishing happen in one step, so `apply_gap` is always zero.
    ProgressUpdate {
        source_gap: u64,
        apply_gap: u64,
    },
    VersionChange {
        version: ProtocolVersion,
    },
}

impl StateChange {
    pub fn between(previous: Option<&CoreWallet>, current: &Arc<CoreWallet>) -> Vec<Self> {
        let progress = current.progress;
        let mut changes = vec![
            Self::State(Arc::clone(current)),
            Self::ProgressUpdate {
                source_gap: progress
                    .highest_transaction_id
                    .saturating_sub(progress.applied_id),
                apply_gap: 0,
            },
        ];
        if let Some(previous) = previous {
            if previous.protocol_version != current.protocol_version {
                changes.push(Self::VersionChange {
                    version: current.protocol_version,
                });
            }
        }
        changes
    }
}
