use crate::{model::FieldType, value::Value};
use std::fmt;

///
/// Expr
///
/// Closed expression tree shared by every clause.
///
/// - `Binding(i)` refers to the whole row of source `i`
/// - `Field` reads one field of a bound source
/// - `Param(k)` is a placeholder for the k-th parameter of its clause
/// - `Literal` is a value inlined into the query structure
///

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Binding(usize),
    Field(FieldAccess),
    Param(usize),
    Literal(Value),
    Apply { op: Operator, args: Vec<Self> },
    Tuple(Vec<Self>),
    List(Vec<Self>),
}

impl Expr {
    #[must_use]
    pub fn field(binding: usize, name: impl Into<String>) -> Self {
        Self::Field(FieldAccess::new(binding, name))
    }

    /// Field access annotated with the type the surrounding expression expects.
    #[must_use]
    pub fn typed_field(binding: usize, name: impl Into<String>, expected: FieldType) -> Self {
        Self::Field(FieldAccess::new(binding, name).expecting(expected))
    }

    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    #[must_use]
    pub const fn apply(op: Operator, args: Vec<Self>) -> Self {
        Self::Apply { op, args }
    }

    #[must_use]
    pub fn eq(left: Self, right: Self) -> Self {
        Self::apply(Operator::Eq, vec![left, right])
    }

    #[must_use]
    pub fn and(left: Self, right: Self) -> Self {
        Self::apply(Operator::And, vec![left, right])
    }

    #[must_use]
    pub fn is_nil(inner: Self) -> Self {
        Self::apply(Operator::IsNil, vec![inner])
    }

    /// Number of placeholder nodes in this tree.
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        match self {
            Self::Param(_) => 1,
            Self::Binding(_) | Self::Field(_) | Self::Literal(_) => 0,
            Self::Apply { args: items, .. } | Self::Tuple(items) | Self::List(items) => {
                items.iter().map(Self::placeholder_count).sum()
            }
        }
    }
}

///
/// FieldAccess
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldAccess {
    pub binding: usize,
    pub name: String,
    pub expected: Option<FieldType>,
}

impl FieldAccess {
    #[must_use]
    pub fn new(binding: usize, name: impl Into<String>) -> Self {
        Self {
            binding,
            name: name.into(),
            expected: None,
        }
    }

    #[must_use]
    pub fn expecting(mut self, expected: FieldType) -> Self {
        self.expected = Some(expected);
        self
    }
}

///
/// Operator
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
    Not,
    In,
    IsNil,
    Like,
    ILike,
    Add,
    Sub,
    Mul,
    Div,
    Count,
    Sum,
    Avg,
    Min,
    Max,
    Asc,
    Desc,
    /// Any other function the generator knows how to render.
    Call(String),
}

impl Operator {
    /// Stable tag used when hashing query structure.
    #[must_use]
    pub const fn tag(&self) -> u8 {
        match self {
            Self::Eq => 0x01,
            Self::Ne => 0x02,
            Self::Lt => 0x03,
            Self::Lte => 0x04,
            Self::Gt => 0x05,
            Self::Gte => 0x06,
            Self::And => 0x07,
            Self::Or => 0x08,
            Self::Not => 0x09,
            Self::In => 0x0a,
            Self::IsNil => 0x0b,
            Self::Like => 0x0c,
            Self::ILike => 0x0d,
            Self::Add => 0x0e,
            Self::Sub => 0x0f,
            Self::Mul => 0x10,
            Self::Div => 0x11,
            Self::Count => 0x12,
            Self::Sum => 0x13,
            Self::Avg => 0x14,
            Self::Min => 0x15,
            Self::Max => 0x16,
            Self::Asc => 0x17,
            Self::Desc => 0x18,
            Self::Call(_) => 0x7f,
        }
    }
}

///
/// ParamType
///
/// Type descriptor attached to a clause-local parameter by the query builder.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParamType {
    /// Concrete type known at build time.
    Type(FieldType),
    /// Type of `binding.field`, resolved through reflection.
    Field { binding: usize, field: String },
    /// Membership list of the wrapped type.
    In(Box<Self>),
}

impl ParamType {
    #[must_use]
    pub fn field(binding: usize, field: impl Into<String>) -> Self {
        Self::Field {
            binding,
            field: field.into(),
        }
    }

    #[must_use]
    pub fn in_(inner: Self) -> Self {
        Self::In(Box::new(inner))
    }
}

///
/// Param
///

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub value: Value,
    pub ty: ParamType,
}

impl Param {
    #[must_use]
    pub fn new(value: impl Into<Value>, ty: ParamType) -> Self {
        Self {
            value: value.into(),
            ty,
        }
    }
}

///
/// Location
///
/// Where the query builder saw the expression. Only used for diagnostics.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

impl Location {
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("nofile", 0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

///
/// QueryExpr
///
/// One clause expression together with its local parameters.
/// After `prepare`, `params` is always empty.
///

#[derive(Clone, Debug, PartialEq)]
pub struct QueryExpr {
    pub expr: Expr,
    pub params: Vec<(usize, Param)>,
    pub location: Location,
}

impl QueryExpr {
    #[must_use]
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            params: Vec::new(),
            location: Location::default(),
        }
    }

    /// Bind the next local parameter. Keys are assigned in call order.
    #[must_use]
    pub fn param(mut self, value: impl Into<Value>, ty: ParamType) -> Self {
        let key = self.params.len();
        self.params.push((key, Param::new(value, ty)));
        self
    }

    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

impl From<Expr> for QueryExpr {
    fn from(expr: Expr) -> Self {
        Self::new(expr)
    }
}
