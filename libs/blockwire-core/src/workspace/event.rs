use serde::{Deserialize, Serialize};

/// One connect or disconnect edit of a workspace graph, as reported by the
/// host surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionEvent {
    pub block_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_parent_id: Option<String>,
    pub workspace_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind<'a> {
    Connect { parent: &'a str },
    Disconnect { parent: &'a str },
    Other,
}

impl ConnectionEvent {
    pub fn connect<W, B, P>(workspace_id: W, block_id: B, parent_id: P) -> Self
    where
        W: Into<String>,
        B: Into<String>,
        P: Into<String>,
    {
        Self {
            block_id: block_id.into(),
            new_parent_id: Some(parent_id.into()),
            old_parent_id: None,
            workspace_id: workspace_id.into(),
        }
    }

    pub fn disconnect<W, B, P>(workspace_id: W, block_id: B, parent_id: P) -> Self
    where
        W: Into<String>,
        B: Into<String>,
        P: Into<String>,
    {
        Self {
            block_id: block_id.into(),
            new_parent_id: None,
            old_parent_id: Some(parent_id.into()),
            workspace_id: workspace_id.into(),
        }
    }

    /// A new parent takes precedence when a host reports both.
    pub fn kind(&self) -> EventKind<'_> {
        match (&self.new_parent_id, &self.old_parent_id) {
            (Some(parent), _) => EventKind::Connect { parent },
            (None, Some(parent)) => EventKind::Disconnect { parent },
            (None, None) => EventKind::Other,
        }
    }
}
