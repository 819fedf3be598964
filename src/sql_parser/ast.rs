use std::fmt;

/// Dotted identifier: `col`, `t.col`, `schema.t.col`, ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectName(pub Vec<String>);

impl ObjectName {
    pub fn parts(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub distinct: bool,
    pub projection: Vec<SelectItem>,
    pub from: Vec<TableWithJoins>,
    pub where_clause: Option<SqlExpr>,
    pub group_by: Vec<SqlExpr>,
    pub having: Option<SqlExpr>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectItem {
    Wildcard,
    QualifiedWildcard(ObjectName),
    Expr { expr: SqlExpr, alias: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableWithJoins {
    pub relation: TableFactor,
    pub joins: Vec<Join>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableFactor {
    Table {
        name: ObjectName,
        alias: Option<String>,
    },
    Derived {
        subquery: Box<SelectStatement>,
        alias: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub relation: TableFactor,
    pub operator: JoinOperator,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinOperator {
    Inner(Option<SqlExpr>),
    LeftOuter(Option<SqlExpr>),
    RightOuter(Option<SqlExpr>),
    FullOuter(Option<SqlExpr>),
    Cross,
}

impl JoinOperator {
    pub fn name(&self) -> &'static str {
        match self {
            JoinOperator::Inner(_) => "INNER JOIN",
            JoinOperator::LeftOuter(_) => "LEFT OUTER JOIN",
            JoinOperator::RightOuter(_) => "RIGHT OUTER JOIN",
            JoinOperator::FullOuter(_) => "FULL OUTER JOIN",
            JoinOperator::Cross => "CROSS JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: SqlExpr,
    pub ascending: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlLiteral {
    String(String),
    Integer(i64),
    Decimal(String),
    Boolean(bool),
    Date(String),
    Time(String),
    Timestamp(String),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    /// `||`
    Concat,
    /// `@@`
    Matches,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Eq => "=",
            BinaryOperator::NotEq => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::BitwiseAnd => "&",
            BinaryOperator::BitwiseOr => "|",
            BinaryOperator::BitwiseXor => "^",
            BinaryOperator::Concat => "||",
            BinaryOperator::Matches => "@@",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Minus,
    Plus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<SqlExpr>,
    pub distinct: bool,
    /// `COUNT(*)`
    pub star: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SqlExpr {
    Column(ObjectName),
    Literal(SqlLiteral),
    /// JDBC `?` placeholder
    Parameter,
    BinaryOp {
        left: Box<SqlExpr>,
        op: BinaryOperator,
        right: Box<SqlExpr>,
    },
    UnaryOp {
        op: UnaryOperator,
        expr: Box<SqlExpr>,
    },
    Nested(Box<SqlExpr>),
    Like {
        negated: bool,
        expr: Box<SqlExpr>,
        pattern: Box<SqlExpr>,
    },
    Between {
        negated: bool,
        expr: Box<SqlExpr>,
        low: Box<SqlExpr>,
        high: Box<SqlExpr>,
    },
    InList {
        negated: bool,
        expr: Box<SqlExpr>,
        list: Vec<SqlExpr>,
    },
    InSubquery {
        negated: bool,
        expr: Box<SqlExpr>,
        subquery: Box<SelectStatement>,
    },
    IsNull {
        negated: bool,
        expr: Box<SqlExpr>,
    },
    Function(FunctionCall),
    Exists(Box<SelectStatement>),
    Subquery(Box<SelectStatement>),
    AnyComparison {
        left: Box<SqlExpr>,
        op: BinaryOperator,
        subquery: Box<SelectStatement>,
    },
    AllComparison {
        left: Box<SqlExpr>,
        op: BinaryOperator,
        subquery: Box<SelectStatement>,
    },
    Case {
        operand: Option<Box<SqlExpr>>,
        conditions: Vec<(SqlExpr, SqlExpr)>,
        else_result: Option<Box<SqlExpr>>,
    },
}

impl SqlExpr {
    pub fn column(parts: &[&str]) -> Self {
        SqlExpr::Column(ObjectName(parts.iter().map(|p| p.to_string()).collect()))
    }

    pub fn binary(left: SqlExpr, op: BinaryOperator, right: SqlExpr) -> Self {
        SqlExpr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }
}
