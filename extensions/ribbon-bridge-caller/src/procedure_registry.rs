use crate::{error::RegistryError, procedure::RibbonProcedure};
use ribbon_bridge::hash::procedure_id_hash;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One procedure a server exposes. Schemas are kept as opaque JSON; the
/// client never validates payloads against them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureDescriptor {
    pub name: String,
    #[serde(default)]
    pub argument_schema: serde_json::Value,
    #[serde(default)]
    pub result_schema: serde_json::Value,
}

impl ProcedureDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            argument_schema: serde_json::Value::Null,
            result_schema: serde_json::Value::Null,
        }
    }

    pub fn with_schemas(
        mut self,
        argument_schema: serde_json::Value,
        result_schema: serde_json::Value,
    ) -> Self {
        self.argument_schema = argument_schema;
        self.result_schema = result_schema;
        self
    }

    pub fn procedure_id(&self) -> u32 {
        procedure_id_hash(&self.name)
    }
}

#[derive(Deserialize)]
struct SchemaDocument {
    procedures: Vec<ProcedureDescriptor>,
}

/// The set of procedures a client may call, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ProcedureRegistry {
    procedures: Vec<ProcedureDescriptor>,
    by_name: HashMap<String, usize>,
}

impl ProcedureRegistry {
    pub fn builder() -> ProcedureRegistryBuilder {
        ProcedureRegistryBuilder::default()
    }

    /// Loads `{"procedures": [{"name": .., "argument_schema": .., "result_schema": ..}]}`.
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let document: SchemaDocument = serde_json::from_str(json)?;

        document
            .procedures
            .into_iter()
            .fold(Self::builder(), ProcedureRegistryBuilder::procedure)
            .build()
    }

    pub fn get(&self, name: &str) -> Option<&ProcedureDescriptor> {
        self.by_name.get(name).map(|&index| &self.procedures[index])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Names of every registered procedure.
    pub fn procedures(&self) -> Vec<&str> {
        self.procedures.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn descriptors(&self) -> &[ProcedureDescriptor] {
        &self.procedures
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct ProcedureRegistryBuilder {
    procedures: Vec<ProcedureDescriptor>,
}

impl ProcedureRegistryBuilder {
    pub fn procedure(mut self, descriptor: ProcedureDescriptor) -> Self {
        self.procedures.push(descriptor);
        self
    }

    pub fn register<P: RibbonProcedure>(self) -> Self {
        self.procedure(P::descriptor())
    }

    /// Rejects duplicate names and names whose hashes collide.
    pub fn build(self) -> Result<ProcedureRegistry, RegistryError> {
        let mut by_name = HashMap::with_capacity(self.procedures.len());
        let mut by_id: HashMap<u32, &str> = HashMap::with_capacity(self.procedures.len());

        for (index, descriptor) in self.procedures.iter().enumerate() {
            if by_name.insert(descriptor.name.clone(), index).is_some() {
                return Err(RegistryError::DuplicateName(descriptor.name.clone()));
            }

            let id = descriptor.procedure_id();
            if let Some(first) = by_id.insert(id, &descriptor.name) {
                return Err(RegistryError::IdCollision {
                    id,
                    first: first.to_string(),
                    second: descriptor.name.clone(),
                });
            }
        }

        Ok(ProcedureRegistry {
            procedures: self.procedures,
            by_name,
        })
    }
}
