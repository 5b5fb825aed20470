use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ids::CollectionId;

/// Storage type of a single collection field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Float,
    Double,
    String,
    BinaryVector,
    FloatVector,
}

impl DataType {
    /// Returns the canonical snake_case name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::BinaryVector => "binary_vector",
            Self::FloatVector => "float_vector",
        }
    }

    /// Returns `true` for vector field types.
    #[must_use]
    pub const fn is_vector(&self) -> bool {
        matches!(self, Self::BinaryVector | Self::FloatVector)
    }
}

impl FromStr for DataType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" => Ok(Self::Bool),
            "int8" => Ok(Self::Int8),
            "int16" => Ok(Self::Int16),
            "int32" => Ok(Self::Int32),
            "int64" => Ok(Self::Int64),
            "float" => Ok(Self::Float),
            "double" => Ok(Self::Double),
            "string" => Ok(Self::String),
            "binary_vector" => Ok(Self::BinaryVector),
            "float_vector" => Ok(Self::FloatVector),
            _ => Err(()),
        }
    }
}

/// A single field of a collection schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub field_id: i64,
    pub name: String,
    pub data_type: DataType,
    #[serde(default)]
    pub is_primary_key: bool,
}

/// Schema of a collection as handed to the datanode by the control plane.
///
/// The schema arrives already validated. The replica stores it verbatim and
/// only reads [`CollectionSchema::name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Human-readable collection name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Whether primary keys are generated by the system.
    #[serde(default)]
    pub auto_id: bool,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

impl CollectionSchema {
    /// Creates a schema with no fields.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            auto_id: false,
            fields: Vec::new(),
        }
    }

    /// Appends a field definition.
    #[must_use]
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Returns the primary key field, if declared.
    #[must_use]
    pub fn primary_key(&self) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.is_primary_key)
    }
}

/// A collection owned by this datanode.
///
/// Immutable once constructed; the name is taken from the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    id: CollectionId,
    schema: CollectionSchema,
}

impl Collection {
    #[must_use]
    pub fn new(id: CollectionId, schema: CollectionSchema) -> Self {
        Self { id, schema }
    }

    #[must_use]
    pub const fn id(&self) -> CollectionId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    #[must_use]
    pub fn schema(&self) -> &CollectionSchema {
        &self.schema
    }
}
