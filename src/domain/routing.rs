//! Networking-node addressing carried alongside messages
//!
//! Messages only carry this data; forwarding across the overlay happens
//! elsewhere.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ids::NetworkingNodeId;

/// The ordered list of networking nodes a message has passed through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkPath(Vec<NetworkingNodeId>);

impl NetworkPath {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = NetworkingNodeId>) -> Self {
        Self(nodes.into_iter().collect())
    }

    /// The node that originally sent the message.
    pub fn origin(&self) -> Option<&NetworkingNodeId> {
        self.0.first()
    }

    /// The node the message was received from most recently.
    pub fn last_hop(&self) -> Option<&NetworkingNodeId> {
        self.0.last()
    }

    /// A copy of this path extended by `node`.
    pub fn append(&self, node: NetworkingNodeId) -> Self {
        let mut nodes = self.0.clone();
        nodes.push(node);
        Self(nodes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkingNodeId> {
        self.0.iter()
    }
}

impl fmt::Display for NetworkPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes: Vec<&str> = self.0.iter().map(NetworkingNodeId::as_str).collect();
        write!(f, "[{}]", nodes.join(" -> "))
    }
}

/// Where a message should go: the final destination plus an optional
/// explicit route through intermediate nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceRouting {
    pub destination: NetworkingNodeId,
    #[serde(default, skip_serializing_if = "NetworkPath::is_empty")]
    pub via: NetworkPath,
}

impl SourceRouting {
    /// Route directly to `destination`.
    pub fn to(destination: impl Into<NetworkingNodeId>) -> Self {
        Self {
            destination: destination.into(),
            via: NetworkPath::empty(),
        }
    }

    /// Route to the peer on the other end of the connection.
    pub fn zero() -> Self {
        Self::to(NetworkingNodeId::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.destination.is_empty()
    }

    /// The node a frame for this route is handed to first.
    pub fn next_hop(&self) -> &NetworkingNodeId {
        self.via.origin().unwrap_or(&self.destination)
    }
}

impl fmt::Display for SourceRouting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            f.write_str("<peer>")?;
        } else {
            f.write_str(self.destination.as_str())?;
        }
        if !self.via.is_empty() {
            write!(f, " via {}", self.via)?;
        }
        Ok(())
    }
}
