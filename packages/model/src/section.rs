use crate::id::ConnectorId;

/// Named group of connectors under a composite node. Sections only organize
/// connectors; they carry no behavior of their own.
#[derive(Debug, Clone)]
pub struct Section {
    name: String,
    connectors: Vec<ConnectorId>,
}

impl Section {
    pub(crate) fn new(name: impl Into<String>, connectors: Vec<ConnectorId>) -> Self {
        Section {
            name: name.into(),
            connectors,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connectors(&self) -> &[ConnectorId] {
        &self.connectors
    }
}
