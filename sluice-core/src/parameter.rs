use crate::Value;

/// How a parameter travels between caller and command.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Input,
    Output,
    InputOutput,
    ReturnValue,
}

impl Direction {
    /// Whether the caller supplies the value.
    pub fn is_input(&self) -> bool {
        matches!(self, Direction::Input | Direction::InputOutput)
    }
    /// Whether the command writes the value back.
    pub fn is_output(&self) -> bool {
        matches!(
            self,
            Direction::Output | Direction::InputOutput | Direction::ReturnValue
        )
    }
}

/// Named value bound to a command, or rendered as a column / argument by the
/// statement builder.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    value: Value,
    /// Explicit storage type, `None` infers it from the value.
    ty: Option<Value>,
    pub direction: Direction,
    pub nullable: bool,
    pub size: Option<u32>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut result = Self {
            name: name.into(),
            nullable: true,
            ..Default::default()
        };
        result.set_value(value);
        result
    }

    /// Output parameter of the given storage type, typically `T::as_empty_value()`.
    pub fn output(name: impl Into<String>, ty: Value) -> Self {
        Self {
            name: name.into(),
            value: ty.as_type(),
            ty: Some(ty.as_type()),
            direction: Direction::Output,
            nullable: true,
            ..Default::default()
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_type(mut self, ty: Value) -> Self {
        self.ty = Some(ty.as_type());
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Stores the value. An absent value (`None`) becomes the typed null of
    /// its type, falling back to the explicit type or `Value::Null`.
    pub fn set_value(&mut self, value: impl Into<Value>) {
        let value = value.into();
        self.value = match (&value, &self.ty) {
            (Value::Null, Some(ty)) => ty.clone(),
            _ => value,
        };
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// Explicit type when present, otherwise inferred from the value.
    pub fn ty(&self) -> Value {
        match &self.ty {
            Some(ty) => ty.clone(),
            None => self.value.as_type(),
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}

impl<N: Into<String>, V: Into<Value>> From<(N, V)> for Parameter {
    fn from((name, value): (N, V)) -> Self {
        Parameter::new(name, value)
    }
}

/// Descriptor of a result column.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    /// Typed null describing the storage type.
    pub ty: Value,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, ty: Value) -> Self {
        Self {
            name: name.into(),
            ty: ty.as_type(),
        }
    }
}
