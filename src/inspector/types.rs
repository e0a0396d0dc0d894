use serde::{Deserialize, Serialize};

/// Exported surface of one package
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedObjects {
    /// Exported constants in declaration order
    pub constants: Vec<ExportedConstant>,

    /// Exported package-level variables in declaration order
    pub variables: Vec<ExportedVariable>,

    /// Named types that are neither structs nor interfaces
    pub types: Vec<ExportedType>,

    /// Exported structs with their methods
    pub structs: Vec<ExportedStruct>,

    /// Exported interfaces with their explicitly declared methods
    pub interfaces: Vec<ExportedInterface>,

    /// Free functions in declaration order
    pub functions: Vec<ExportedRoutine>,
}

impl ExportedObjects {
    /// Total number of exported declarations, struct methods included
    pub fn len(&self) -> usize {
        self.constants.len()
            + self.variables.len()
            + self.types.len()
            + self.structs.len()
            + self.structs.iter().map(|s| s.methods.len()).sum::<usize>()
            + self.interfaces.len()
            + self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First struct named `name`
    pub fn find_struct_mut(&mut self, name: &str) -> Option<&mut ExportedStruct> {
        self.structs.iter_mut().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedConstant {
    pub name: String,

    /// Canonical type, without the `untyped ` qualifier
    pub type_name: String,

    /// Initializer text; string literals lose their quotes
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedVariable {
    pub name: String,
    pub type_name: String,
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// A named type over a non-struct, non-interface type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedType {
    pub name: String,
    pub underlying_type_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedField {
    pub name: String,
    pub type_name: String,
}

/// Positional argument of a routine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedArgument {
    /// Empty for unnamed parameters
    pub name: String,
    pub type_name: String,
}

/// A function, a method, or an interface method signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedRoutine {
    pub name: String,
    pub arguments: Vec<ExportedArgument>,
    pub return_types: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedInterface {
    pub name: String,
    pub methods: Vec<ExportedRoutine>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedStruct {
    pub name: String,
    pub fields: Vec<ExportedField>,

    /// Methods of the struct, attached once the whole package was walked
    pub methods: Vec<ExportedRoutine>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}
