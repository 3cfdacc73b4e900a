//! Node records and the grammar table.
//!
//! Every address in a [`Tree`](crate::Tree) holds one [`Node`]. A node is
//! either a [`Node::Leaf`] carrying raw source text (identifier, literal,
//! string tag, comment body), an explicitly empty placeholder, or a
//! structural record identified by its [`Category`], a small per-category
//! variant, and (for the open-arity categories) a declared child count.
//!
//! Structural children are never stored inside the record; they live at the
//! parent's child run and are discovered purely by run presence.

use smol_str::SmolStr;

/// One record in the flat store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Structurally present but content-free, e.g. the omitted low bound of
    /// a slice expression. Counts toward run continuation, unlike an absent
    /// key, which terminates the run.
    Empty,
    /// Raw text emitted verbatim by the unparser.
    Leaf(SmolStr),
    /// The universe block. Exactly one, at address 0.
    Root,
    /// A single Go file; child of [`Node::Root`]. Children are the top-level
    /// declarations in source order.
    File,
    /// The `package` clause. First child is the package name leaf, optionally
    /// followed by an import comment.
    Package(PackageKind),
    /// A single import: one or two leaf children (path, or local name and
    /// path). Standalone when its parent is the file, grouped when its parent
    /// is an [`Node::ImportGroup`].
    Import,
    /// A parenthesized `import ( … )` group of [`Node::Import`] children.
    ImportGroup,
    /// A top-level function. First child is the name leaf, then the receiver
    /// (when `receiver` is set), `params` proper parameters, any number of
    /// result fields, and an optional trailing [`Node::Block`] body.
    Func { receiver: bool, params: u64 },
    /// A field group: name leaves followed by a [`Node::TypeRoot`], and for
    /// struct fields an optional trailing tag leaf.
    TypedIdent(FieldKind),
    /// Marks the root of a type expression; its only child is the type.
    TypeRoot,
    /// A `type` declaration or alias. First child is the name leaf.
    TypeDef(TypeDefKind),
    /// A struct type; children are [`Node::TypedIdent`] fields.
    Struct,
    /// An interface type; children are [`Node::Method`] or [`Node::TypeRoot`]
    /// (embedded interface) nodes.
    Interface,
    /// An interface method. Children are [`Node::TypedIdent`] nodes; the
    /// first holds the method name, the next `params` hold parameters, the
    /// rest results.
    Method { params: u64 },
    /// A childless branch statement (`;`, `break`, `continue`, `fallthrough`,
    /// `goto`).
    Branch(BranchKind),
    /// `go` or `defer` applied to the single call-expression child.
    GoDefer(GoDeferKind),
    /// A `return` statement; children are the returned expressions.
    Return,
    /// `++` or `--` applied to the single operand child.
    IncDec(IncDecKind),
    /// A `var` or `const` declaration; children are one [`Node::Assign`] row
    /// each, two or more rows rendering as a parenthesized group.
    VarDef(VarDefKind),
    /// A label declaration or a labeled `goto`/`continue`/`break`. The only
    /// child is the label name leaf.
    Label(LabelKind),
    /// A comment, printed verbatim from its single leaf child. The kind is
    /// assigned by the comment classifier.
    Comment(CommentKind),
    /// An operator or expression form with `operands` children.
    Expr { kind: ExprKind, operands: u64 },
    /// A statement block. The first `header` children are header elements
    /// (condition, init statement, explicit semicolons, case expressions);
    /// the rest are body statements.
    Block { kind: BlockKind, header: u64 },
    /// One assignment or declaration row with `elems` children covering both
    /// sides and, for some kinds, a central type node.
    Assign { kind: AssignKind, elems: u64 },
    /// A function literal with `params` parameters, then result fields, then
    /// the body block.
    Closure { params: u64 },
}

/// The structural node families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Root,
    File,
    Package,
    Import,
    ImportGroup,
    Func,
    TypedIdent,
    TypeRoot,
    TypeDef,
    Struct,
    Interface,
    Method,
    Branch,
    GoDefer,
    Return,
    IncDec,
    VarDef,
    Label,
    Comment,
    Expr,
    Block,
    Assign,
    Closure,
}

/// Block statement kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// A plain braced block with no header.
    Plain,
    /// An `if` block; one or three header elements. May follow an
    /// [`BlockKind::IfElse`] sibling, continuing an `else if` chain.
    If,
    /// An `if` block that is followed by an `else`; must be followed by a
    /// [`BlockKind::Plain`] or [`BlockKind::If`] sibling.
    IfElse,
    /// A value switch; children after the header are cases and defaults.
    Switch,
    /// A `for` loop; any range clause lives inside the header's assign row.
    For,
    /// A `for range` loop with no iteration variables.
    ForRange,
    /// A switch over a `.(type)` header expression.
    TypeSwitch,
    /// A `select` block; no header, communicate-clause children only.
    Select,
    /// A `case` clause with comma-separated header expressions and a
    /// colon-terminated header.
    Case,
    /// A `default:` clause of a switch.
    Default,
    /// Headerless, braceless statement sequence. Unused by the builder but
    /// part of the table.
    None,
    /// A `case` clause of a select, exactly one header element.
    Communicate,
    /// A `default:` clause of a select.
    CommunicateDefault,
}

/// Expression kinds, covering operators, type constructors and call shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    /// A single child wrapped in round brackets.
    Brackets,
    OrOr,
    AndAnd,
    Equal,
    NotEq,
    LessThan,
    LessEq,
    GreaterEq,
    GreaterThan,
    /// Binary addition, or unary plus with one operand.
    Plus,
    /// Binary subtraction, or unary minus with one operand.
    Minus,
    BitOr,
    /// Binary xor, or unary complement with one operand.
    BitXor,
    /// Multiplication, or pointer dereference/pointer type with one operand.
    Mul,
    Div,
    Rem,
    /// Bitwise and, or address-of with one operand.
    BitAnd,
    AndNot,
    Shl,
    Shr,
    Not,
    /// Dot-separated selector or qualified identifier.
    Dot,
    /// A slice expression; omitted bounds are explicit-empty children.
    Slice,
    /// A composite literal: type operand followed by the elements.
    Composite,
    /// A non-variadic call: callee operand followed by the arguments.
    Call,
    /// A send statement, or a unary receive with one operand.
    Arrow,
    ArrayType,
    SliceType,
    /// `key: value` inside a composite literal.
    KeyVal,
    /// A type assertion; unary form asserts the reserved word `type`.
    TypeAssert,
    /// A call whose last argument is expanded with `...`.
    CallVariadic,
    /// A literal value nested inside a composite literal.
    Composed,
    Index,
    MapType,
    /// Wrapper around a single leaf, for positions that require an
    /// expression node.
    Identifier,
    Chan,
    SendChan,
    RecvChan,
}

/// Assignment row kinds. The `OneRhs` forms keep a single expression on the
/// right-hand side; the `Range` forms belong to `for … range` headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignKind {
    Eq,
    Define,
    AndNot,
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    /// A constant-group row after the `iota` row: names only.
    IotaTail,
    /// A declaration row whose last element is the type, with no initializer.
    TypeTail,
    OneRhsEq,
    OneRhsDefine,
    RangeEq,
    RangeDefine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    Semi,
    Break,
    Continue,
    Fallthrough,
    Goto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoDeferKind {
    Go,
    Defer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncDecKind {
    Inc,
    Dec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarDefKind {
    Var,
    Const,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKind {
    /// `name:` label declaration.
    Label,
    Goto,
    Continue,
    Break,
}

/// Field group kinds: how the names connect to the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Normal,
    /// Names, `=`, type: a type parameter default style group.
    Equals,
    /// Variadic parameter: names, `...`, type.
    Ellipsis,
    /// Struct field carrying a trailing tag leaf.
    Tagged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeDefKind {
    Normal,
    Alias,
}

/// Comment placement, assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentKind {
    /// Starts at the end of a line holding other content.
    Ender,
    /// Occupies its own line.
    Normal,
    /// Occupies its own line after one or more blank lines; rendered with a
    /// preceding blank line.
    Separate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageKind {
    Normal,
    /// The package clause follows one or more blank lines.
    Separate,
}

impl Node {
    /// Creates a leaf from raw source text.
    pub fn leaf(text: impl Into<SmolStr>) -> Node {
        Node::Leaf(text.into())
    }

    /// The structural family of this record, or `None` for leaves and
    /// explicit-empty placeholders.
    pub fn category(&self) -> Option<Category> {
        match self {
            Node::Empty | Node::Leaf(_) => None,
            Node::Root => Some(Category::Root),
            Node::File => Some(Category::File),
            Node::Package(_) => Some(Category::Package),
            Node::Import => Some(Category::Import),
            Node::ImportGroup => Some(Category::ImportGroup),
            Node::Func { .. } => Some(Category::Func),
            Node::TypedIdent(_) => Some(Category::TypedIdent),
            Node::TypeRoot => Some(Category::TypeRoot),
            Node::TypeDef(_) => Some(Category::TypeDef),
            Node::Struct => Some(Category::Struct),
            Node::Interface => Some(Category::Interface),
            Node::Method { .. } => Some(Category::Method),
            Node::Branch(_) => Some(Category::Branch),
            Node::GoDefer(_) => Some(Category::GoDefer),
            Node::Return => Some(Category::Return),
            Node::IncDec(_) => Some(Category::IncDec),
            Node::VarDef(_) => Some(Category::VarDef),
            Node::Label(_) => Some(Category::Label),
            Node::Comment(_) => Some(Category::Comment),
            Node::Expr { .. } => Some(Category::Expr),
            Node::Block { .. } => Some(Category::Block),
            Node::Assign { .. } => Some(Category::Assign),
            Node::Closure { .. } => Some(Category::Closure),
        }
    }

    /// The per-category variant, the original encoding's `length - 1`.
    pub fn variant(&self) -> u8 {
        match self {
            Node::Package(k) => *k as u8,
            Node::TypedIdent(k) => *k as u8,
            Node::TypeDef(k) => *k as u8,
            Node::Branch(k) => *k as u8,
            Node::GoDefer(k) => *k as u8,
            Node::IncDec(k) => *k as u8,
            Node::VarDef(k) => *k as u8,
            Node::Label(k) => *k as u8,
            Node::Comment(k) => *k as u8,
            Node::Expr { kind, .. } => *kind as u8,
            Node::Block { kind, .. } => *kind as u8,
            Node::Assign { kind, .. } => *kind as u8,
            // Func and Closure fold their counts into the length axis.
            Node::Func { receiver, .. } => *receiver as u8,
            Node::Closure { params } => *params as u8,
            Node::Method { params } => *params as u8,
            _ => 0,
        }
    }

    /// The declared child/header count, the original encoding's
    /// `capacity - baseline`. Categories without an independent slots axis
    /// report their variant-derived count.
    pub fn slots(&self) -> u64 {
        match self {
            Node::Expr { operands, .. } => *operands,
            Node::Block { header, .. } => *header,
            Node::Assign { elems, .. } => *elems,
            Node::Func { receiver, params } => params + u64::from(*receiver) + 1,
            Node::Closure { params } => *params,
            Node::Method { params } => *params,
            _ => 0,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    /// Leaf text, or `""` for anything that is not a leaf.
    pub fn text(&self) -> &str {
        match self {
            Node::Leaf(text) => text,
            _ => "",
        }
    }
}
