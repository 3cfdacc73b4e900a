use flatgo_ast::{
    AssignKind, BlockKind, BranchKind, CommentKind, ExprKind, FieldKind, GoDeferKind, IncDecKind,
    LabelKind, Node, PackageKind, Tree, TypeDefKind, VarDefKind, addr,
};

use crate::error::RenderError;

/// Recursion ceiling; far beyond any real nesting depth, well inside the
/// default thread stack.
const MAX_DEPTH: usize = 512;

/// Renders the subtree rooted at `root` to Go source text.
pub fn render(tree: &Tree, root: u64) -> Result<String, RenderError> {
    Unparser::new().render(tree, root)
}

/// The unparsing engine: one depth-first, left-to-right walk over the flat
/// store, emitting a category-specific prefix, the child run, and
/// separators/terminators decided from the node's tag plus at most one
/// sibling's category.
#[derive(Debug, Default)]
pub struct Unparser {
    out: String,
    // Length of `out` up to and including the last leaf emission. Text
    // before this mark came from the source and must survive verbatim.
    verbatim: usize,
}

impl Unparser {
    pub fn new() -> Unparser {
        Unparser::default()
    }

    pub fn render(mut self, tree: &Tree, root: u64) -> Result<String, RenderError> {
        self.node(tree, root, root, 0)?;
        self.trim_line_end();
        Ok(self.out)
    }

    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn newline(&mut self) {
        self.trim_line_end();
        self.out.push('\n');
    }

    /// Drops spaces the separator logic left dangling at the end of the
    /// current line. Never reaches into leaf text.
    fn trim_line_end(&mut self) {
        let tail = self.out[self.verbatim..].trim_end_matches([' ', '\t']).len();
        self.out.truncate(self.verbatim + tail);
    }

    fn node(&mut self, tree: &Tree, key: u64, parent: u64, depth: usize) -> Result<(), RenderError> {
        if depth > MAX_DEPTH {
            return Err(RenderError::TooDeep { depth });
        }
        let Some(node) = tree.get(key) else {
            return Ok(());
        };
        match node {
            Node::Empty => Ok(()),
            Node::Leaf(text) => {
                self.out.push_str(text);
                self.verbatim = self.out.len();
                Ok(())
            }
            Node::Root | Node::TypeRoot | Node::File => {
                if matches!(node, Node::File) {
                    return self.file(tree, key, depth);
                }
                self.children(tree, key, depth)
            }
            Node::Package(kind) => self.package(tree, key, depth, *kind),
            Node::Import => self.import(tree, key, parent, depth),
            Node::ImportGroup => self.import_group(tree, key, depth),
            Node::Func { receiver, params } => self.func(tree, key, depth, *receiver, *params),
            Node::TypedIdent(kind) => self.typed_ident(tree, key, depth, *kind),
            Node::TypeDef(kind) => self.type_def(tree, key, depth, *kind),
            Node::Struct => self.braced_list(tree, key, depth, "struct{"),
            Node::Interface => self.braced_list(tree, key, depth, "interface{"),
            Node::Method { params } => self.method(tree, key, depth, *params),
            Node::Branch(kind) => self.branch(tree, key, depth, *kind),
            Node::GoDefer(kind) => self.go_defer(tree, key, depth, *kind),
            Node::Return => self.return_stmt(tree, key, depth),
            Node::IncDec(kind) => self.inc_dec(tree, key, depth, *kind),
            Node::VarDef(kind) => self.var_def(tree, key, depth, *kind),
            Node::Label(kind) => self.label(tree, key, depth, *kind),
            Node::Comment(kind) => self.comment(tree, key, depth, *kind),
            Node::Expr { kind, operands } => self.expr(tree, key, depth, *kind, *operands),
            Node::Block { kind, header } => self.block(tree, key, depth, *kind, *header),
            Node::Assign { kind, elems } => self.assign(tree, key, depth, *kind, *elems),
            Node::Closure { params } => self.closure(tree, key, depth, *params),
        }
    }

    /// Renders the child run with no separators.
    fn children(&mut self, tree: &Tree, key: u64, depth: usize) -> Result<(), RenderError> {
        for i in 0u64.. {
            let child = addr::child(key, i);
            if !tree.contains(child) {
                break;
            }
            self.node(tree, child, key, depth + 1)?;
        }
        Ok(())
    }

    /// File children are newline-separated, except that an end-of-line
    /// comment continues the previous child's line.
    fn file(&mut self, tree: &Tree, key: u64, depth: usize) -> Result<(), RenderError> {
        for i in 0u64.. {
            let Some(cur) = tree.child(key, i) else {
                break;
            };
            let cur_is_ender = matches!(cur, Node::Comment(CommentKind::Ender));
            self.node(tree, addr::child(key, i), key, depth + 1)?;
            let next = tree.child(key, i + 1);
            let next_is_ender = matches!(next, Some(Node::Comment(CommentKind::Ender)));
            if !next_is_ender {
                self.newline();
            }
            // Two consecutive end-of-line comments cannot share a line.
            if cur_is_ender && next_is_ender {
                self.newline();
            }
        }
        Ok(())
    }

    fn package(
        &mut self,
        tree: &Tree,
        key: u64,
        depth: usize,
        kind: PackageKind,
    ) -> Result<(), RenderError> {
        if kind == PackageKind::Separate {
            self.newline();
        }
        self.push("package ");
        self.children(tree, key, depth)
    }

    fn import(
        &mut self,
        tree: &Tree,
        key: u64,
        parent: u64,
        depth: usize,
    ) -> Result<(), RenderError> {
        let grouped = matches!(tree.get(parent), Some(Node::ImportGroup));
        if !grouped {
            self.push("import ");
        }
        for i in 0u64.. {
            let child = addr::child(key, i);
            if !tree.contains(child) {
                break;
            }
            self.node(tree, child, key, depth + 1)?;
            if i == 0 && tree.child(key, 1).is_some_and(|n| !n.text().is_empty()) {
                self.push(" ");
            }
        }
        if grouped {
            self.newline();
        }
        Ok(())
    }

    fn import_group(&mut self, tree: &Tree, key: u64, depth: usize) -> Result<(), RenderError> {
        self.push("import (");
        self.newline();
        self.children(tree, key, depth)?;
        self.push(")");
        Ok(())
    }

    /// A top-level function. The name leaf is the first child but is emitted
    /// between the receiver and the parameter list, so it is skipped during
    /// iteration and written from the separator logic instead.
    fn func(
        &mut self,
        tree: &Tree,
        key: u64,
        depth: usize,
        receiver: bool,
        params: u64,
    ) -> Result<(), RenderError> {
        let name = tree.child(key, 0).map(Node::text).unwrap_or_default().to_string();
        // Declared child count: name, optional receiver, proper parameters.
        // Result fields and the body block follow beyond it.
        let declared = params + u64::from(receiver) + 1;
        self.push("func ");
        if receiver {
            self.push("(");
        }
        for i in 0u64.. {
            let Some(cur) = tree.child(key, i) else {
                self.newline();
                break;
            };
            let cur_blockish = cur.is_empty() || matches!(cur, Node::Block { .. });
            if i > 0 {
                self.node(tree, addr::child(key, i), key, depth + 1)?;
            }
            let next = tree.child(key, i + 1);
            let next_blockish =
                next.is_none_or(|n| n.is_empty() || matches!(n, Node::Block { .. }));
            let no_params = params == 0;
            let at_name = i == 0;
            let after_receiver = i == 1;
            let last_param = i + 1 == declared;
            if cur_blockish {
                // The body; nothing to separate.
            } else if next_blockish {
                if no_params && (receiver == after_receiver) && (at_name != after_receiver) {
                    if after_receiver {
                        self.push(") ");
                    }
                    self.push(&name);
                    self.push("()");
                } else {
                    self.push(")");
                }
            } else {
                if !at_name {
                    if receiver && after_receiver {
                        self.push(") ");
                        self.push(&name);
                        self.push("(");
                    } else if !last_param {
                        self.push(", ");
                    }
                } else if !receiver {
                    self.push(&name);
                    self.push("(");
                }
                if last_param {
                    self.push(")(");
                }
            }
        }
        Ok(())
    }

    fn typed_ident(
        &mut self,
        tree: &Tree,
        key: u64,
        depth: usize,
        kind: FieldKind,
    ) -> Result<(), RenderError> {
        let type_at = |i: u64| matches!(tree.child(key, i), Some(Node::TypeRoot));
        if kind == FieldKind::Ellipsis && !type_at(1) {
            self.push("...");
        }
        for i in 0u64.. {
            let Some(cur) = tree.child(key, i) else {
                break;
            };
            let name_like = !cur.is_empty() && !matches!(cur, Node::TypeRoot);
            // The struct tag trails the type and needs a space before it.
            if name_like && i > 0 && type_at(i - 1) {
                self.push(" ");
            }
            self.node(tree, addr::child(key, i), key, depth + 1)?;
            if !name_like {
                continue;
            }
            let next = tree.child(key, i + 1);
            if next.is_some_and(|n| !n.is_empty() && !matches!(n, Node::TypeRoot)) {
                self.push(", ");
            } else {
                match kind {
                    FieldKind::Normal | FieldKind::Tagged => self.push(" "),
                    FieldKind::Equals => self.push(" = "),
                    FieldKind::Ellipsis => self.push(" ..."),
                }
            }
        }
        Ok(())
    }

    fn type_def(
        &mut self,
        tree: &Tree,
        key: u64,
        depth: usize,
        kind: TypeDefKind,
    ) -> Result<(), RenderError> {
        self.push("type ");
        for i in 0u64.. {
            let child = addr::child(key, i);
            if !tree.contains(child) {
                self.newline();
                break;
            }
            self.node(tree, child, key, depth + 1)?;
            if i == 0 {
                self.push(" ");
                if kind == TypeDefKind::Alias {
                    self.push("= ");
                }
            }
        }
        Ok(())
    }

    /// `struct{ … }` and `interface{ … }` bodies: one member per line.
    fn braced_list(
        &mut self,
        tree: &Tree,
        key: u64,
        depth: usize,
        open: &str,
    ) -> Result<(), RenderError> {
        self.push(open);
        if tree.child(key, 0).is_some_and(|n| !n.is_empty()) {
            self.newline();
        }
        for i in 0u64.. {
            let child = addr::child(key, i);
            if !tree.contains(child) {
                self.push("}");
                break;
            }
            self.node(tree, child, key, depth + 1)?;
            self.newline();
        }
        Ok(())
    }

    fn method(
        &mut self,
        tree: &Tree,
        key: u64,
        depth: usize,
        params: u64,
    ) -> Result<(), RenderError> {
        for i in 0u64.. {
            let child = addr::child(key, i);
            if !tree.contains(child) {
                break;
            }
            self.node(tree, child, key, depth + 1)?;
            let next_absent = tree.child(key, i + 1).is_none_or(Node::is_empty);
            if i == 0 {
                if next_absent {
                    self.push("()");
                } else {
                    if params == 0 {
                        self.push("()");
                    }
                    self.push("(");
                }
            } else if next_absent {
                self.push(")");
            } else if i == params {
                self.push(")(");
            } else {
                self.push(", ");
            }
        }
        Ok(())
    }

    fn branch(
        &mut self,
        tree: &Tree,
        key: u64,
        depth: usize,
        kind: BranchKind,
    ) -> Result<(), RenderError> {
        self.push(match kind {
            BranchKind::Semi => ";",
            BranchKind::Break => "break",
            BranchKind::Continue => "continue",
            BranchKind::Fallthrough => "fallthrough",
            BranchKind::Goto => "goto",
        });
        self.children(tree, key, depth)
    }

    fn go_defer(
        &mut self,
        tree: &Tree,
        key: u64,
        depth: usize,
        kind: GoDeferKind,
    ) -> Result<(), RenderError> {
        self.push(match kind {
            GoDeferKind::Go => "go ",
            GoDeferKind::Defer => "defer ",
        });
        self.children(tree, key, depth)
    }

    fn return_stmt(&mut self, tree: &Tree, key: u64, depth: usize) -> Result<(), RenderError> {
        self.push("return ");
        for i in 0u64.. {
            let child = addr::child(key, i);
            if !tree.contains(child) {
                break;
            }
            self.node(tree, child, key, depth + 1)?;
            if tree.child(key, i + 1).is_some_and(|n| !n.is_empty()) {
                self.push(", ");
            }
        }
        Ok(())
    }

    fn inc_dec(
        &mut self,
        tree: &Tree,
        key: u64,
        depth: usize,
        kind: IncDecKind,
    ) -> Result<(), RenderError> {
        self.children(tree, key, depth)?;
        self.push(match kind {
            IncDecKind::Inc => "++",
            IncDecKind::Dec => "--",
        });
        Ok(())
    }

    fn var_def(
        &mut self,
        tree: &Tree,
        key: u64,
        depth: usize,
        kind: VarDefKind,
    ) -> Result<(), RenderError> {
        // Rows materialize as children; two or more render as a group.
        let occupied = |i: u64| {
            tree.child(key, i)
                .is_some_and(|n| !n.is_empty() && !(n.is_leaf() && n.text().is_empty()))
        };
        self.push(match kind {
            VarDefKind::Var => "var ",
            VarDefKind::Const => "const ",
        });
        if occupied(1) {
            self.push("(");
            self.newline();
        } else if !occupied(0) {
            self.push("()");
        }
        for i in 0u64.. {
            let child = addr::child(key, i);
            if !tree.contains(child) {
                break;
            }
            self.node(tree, child, key, depth + 1)?;
            if occupied(i) && occupied(i + 1) {
                self.newline();
            }
            if i > 0 && occupied(i - 1) && !occupied(i + 1) {
                self.newline();
                self.push(")");
                self.newline();
            }
        }
        Ok(())
    }

    fn label(
        &mut self,
        tree: &Tree,
        key: u64,
        depth: usize,
        kind: LabelKind,
    ) -> Result<(), RenderError> {
        match kind {
            LabelKind::Goto => self.push("goto "),
            LabelKind::Continue => self.push("continue "),
            LabelKind::Break => self.push("break "),
            LabelKind::Label => {}
        }
        self.children(tree, key, depth)?;
        if kind == LabelKind::Label {
            self.push(": ");
        }
        Ok(())
    }

    fn comment(
        &mut self,
        tree: &Tree,
        key: u64,
        depth: usize,
        kind: CommentKind,
    ) -> Result<(), RenderError> {
        if kind == CommentKind::Separate {
            self.newline();
        }
        self.children(tree, key, depth)
    }

    fn expr(
        &mut self,
        tree: &Tree,
        key: u64,
        depth: usize,
        kind: ExprKind,
        operands: u64,
    ) -> Result<(), RenderError> {
        if operands == 1 {
            match kind {
                ExprKind::Brackets => self.push("("),
                ExprKind::Plus => self.push("+"),
                ExprKind::Minus => self.push("-"),
                ExprKind::BitXor => self.push("^"),
                ExprKind::Mul => self.push("*"),
                ExprKind::BitAnd => self.push("&"),
                ExprKind::Not => self.push("!"),
                ExprKind::Arrow => self.push("<-"),
                ExprKind::Chan => self.push("chan "),
                ExprKind::SendChan => self.push("chan<- "),
                ExprKind::RecvChan => self.push("<-chan "),
                ExprKind::Composed => self.push("{"),
                _ => {}
            }
        } else {
            match kind {
                ExprKind::ArrayType => self.push("[]"),
                ExprKind::Composed => {
                    self.push("{");
                    if operands == 0 {
                        self.push("}");
                    }
                }
                ExprKind::SliceType => self.push("["),
                ExprKind::MapType => self.push("map["),
                _ => {}
            }
        }
        for i in 0u64.. {
            let child = addr::child(key, i);
            if !tree.contains(child) {
                break;
            }
            self.node(tree, child, key, depth + 1)?;
            self.expr_separator(kind, operands, i + 1);
        }
        Ok(())
    }

    /// The separator/terminator after the `pos`th (1-based) operand. The 0-,
    /// 1- and N-operand shapes take distinct paths: the token before the
    /// first operand differs from interior separators and from the closer.
    fn expr_separator(&mut self, kind: ExprKind, operands: u64, pos: u64) {
        if operands > 1 && pos != operands {
            match kind {
                ExprKind::Dot => self.push("."),
                ExprKind::Call | ExprKind::CallVariadic => {
                    self.push(if pos == 1 { "(" } else { "," });
                }
                ExprKind::OrOr => self.push(" || "),
                ExprKind::AndAnd => self.push(" && "),
                ExprKind::Equal => self.push(" == "),
                ExprKind::NotEq => self.push(" != "),
                ExprKind::LessThan => self.push(" < "),
                ExprKind::LessEq => self.push(" <= "),
                ExprKind::GreaterEq => self.push(" >= "),
                ExprKind::GreaterThan => self.push(" > "),
                ExprKind::Plus => self.push(" + "),
                ExprKind::Minus => self.push(" - "),
                ExprKind::BitOr => self.push(" | "),
                ExprKind::BitXor => self.push(" ^ "),
                ExprKind::Mul => self.push(" * "),
                ExprKind::Div => self.push(" / "),
                ExprKind::Rem => self.push(" % "),
                ExprKind::BitAnd => self.push(" & "),
                ExprKind::AndNot => self.push(" &^ "),
                ExprKind::Shl => self.push(" << "),
                ExprKind::Shr => self.push(" >> "),
                ExprKind::Arrow => self.push(" <- "),
                ExprKind::KeyVal => self.push(": "),
                ExprKind::Index => self.push("["),
                ExprKind::Slice => self.push(if pos == 1 { "[" } else { ":" }),
                ExprKind::Composite => self.push(if pos == 1 { "{" } else { ", " }),
                ExprKind::Composed => self.push(", "),
                ExprKind::MapType | ExprKind::SliceType => self.push("]"),
                ExprKind::TypeAssert => self.push(".("),
                _ => {}
            }
        } else if pos == 1 && operands == 1 {
            match kind {
                ExprKind::Brackets => self.push(")"),
                ExprKind::Call | ExprKind::CallVariadic => self.push("()"),
                ExprKind::Composed => self.push("}"),
                ExprKind::Composite => self.push("{}"),
                ExprKind::TypeAssert => self.push(".(type)"),
                _ => {}
            }
        } else if pos == operands && pos > 0 {
            match kind {
                ExprKind::Index => self.push("]"),
                ExprKind::Slice => self.push(if operands == 2 { ":]" } else { "]" }),
                ExprKind::Composed | ExprKind::Composite => self.push("}"),
                ExprKind::CallVariadic => self.push("...)"),
                ExprKind::Call => self.push(")"),
                ExprKind::TypeAssert => self.push(")"),
                _ => {}
            }
        }
    }

    fn block(
        &mut self,
        tree: &Tree,
        key: u64,
        depth: usize,
        kind: BlockKind,
        header: u64,
    ) -> Result<(), RenderError> {
        match kind {
            BlockKind::If | BlockKind::IfElse => self.push("if "),
            BlockKind::For => self.push("for "),
            BlockKind::ForRange => self.push("for range "),
            BlockKind::Switch | BlockKind::TypeSwitch => self.push("switch "),
            BlockKind::Select => self.push("select "),
            BlockKind::Case | BlockKind::Communicate => self.push("case "),
            BlockKind::Default | BlockKind::CommunicateDefault => {
                self.push("default:");
                self.newline();
            }
            BlockKind::Plain | BlockKind::None => {}
        }
        let braced = (kind as u8) < BlockKind::Case as u8;
        if header == 0 && braced {
            self.push("{");
            self.newline();
        }
        for i in 0u64.. {
            let child = addr::child(key, i);
            if !tree.contains(child) {
                if braced {
                    self.push("}");
                }
                if kind == BlockKind::IfElse {
                    self.push(" else");
                }
                break;
            }
            self.node(tree, child, key, depth + 1)?;
            if i + 1 == header {
                match kind {
                    BlockKind::Case | BlockKind::Communicate => {
                        self.push(":");
                        self.newline();
                    }
                    _ if braced => {
                        self.push("{");
                        self.newline();
                    }
                    _ => {}
                }
            } else if i + 1 > header {
                self.newline();
            } else if kind == BlockKind::Case {
                self.push(", ");
            }
        }
        Ok(())
    }

    fn assign(
        &mut self,
        tree: &Tree,
        key: u64,
        depth: usize,
        kind: AssignKind,
        elems: u64,
    ) -> Result<(), RenderError> {
        for i in 0u64.. {
            let child = addr::child(key, i);
            if !tree.contains(child) {
                break;
            }
            self.node(tree, child, key, depth + 1)?;
            self.assign_separator(kind, elems, i + 1);
        }
        Ok(())
    }

    /// The separator after the `pos`th (1-based) element. The operator sits
    /// mid-row for the two-sided kinds and next-to-last for the one-rhs and
    /// range kinds; a central type node is set off by plain spaces.
    fn assign_separator(&mut self, kind: AssignKind, elems: u64, pos: u64) {
        let k = kind as u8;
        let type_tail = AssignKind::TypeTail as u8;
        if pos == elems {
            self.push(" ");
        } else if pos + 1 == elems && k > type_tail {
            match kind {
                AssignKind::OneRhsEq => self.push(" = "),
                AssignKind::OneRhsDefine => self.push(" := "),
                AssignKind::RangeEq => self.push(" = range "),
                AssignKind::RangeDefine => self.push(" := range "),
                _ => {}
            }
        } else if pos == (elems + 1) >> 1 && kind != AssignKind::TypeTail {
            match kind {
                AssignKind::Eq => self.push(" = "),
                AssignKind::Define => self.push(" := "),
                AssignKind::Add => self.push(" += "),
                AssignKind::Sub => self.push(" -= "),
                AssignKind::Mul => self.push(" *= "),
                AssignKind::Quo => self.push(" /= "),
                AssignKind::Rem => self.push(" %= "),
                AssignKind::And => self.push(" &= "),
                AssignKind::Or => self.push(" |= "),
                AssignKind::Xor => self.push(" ^= "),
                AssignKind::Shl => self.push(" <<= "),
                AssignKind::Shr => self.push(" >>= "),
                AssignKind::AndNot => self.push(" &^= "),
                AssignKind::OneRhsEq
                | AssignKind::OneRhsDefine
                | AssignKind::RangeEq
                | AssignKind::RangeDefine
                | AssignKind::IotaTail => self.push(", "),
                _ => {}
            }
        } else if pos == elems >> 1 && k < type_tail {
            self.push(" ");
        } else if pos + 1 != elems || kind != AssignKind::TypeTail {
            self.push(", ");
        } else {
            self.push(" ");
        }
    }

    fn closure(
        &mut self,
        tree: &Tree,
        key: u64,
        depth: usize,
        params: u64,
    ) -> Result<(), RenderError> {
        let blockish = |n: Option<&Node>| {
            n.is_none_or(|n| n.is_empty() || matches!(n, Node::Block { .. }))
        };
        self.push("func(");
        if params == 0 {
            self.push(")(");
        }
        if blockish(tree.child(key, 0)) {
            self.push(")");
        }
        for i in 0u64.. {
            let child = addr::child(key, i);
            if !tree.contains(child) {
                break;
            }
            self.node(tree, child, key, depth + 1)?;
            let cur_blockish = blockish(tree.child(key, i));
            if blockish(tree.child(key, i + 1)) {
                if !cur_blockish {
                    self.push(")");
                }
            } else if !cur_blockish {
                if i + 1 == params {
                    self.push(")(");
                } else {
                    self.push(", ");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use flatgo_ast::ROOT;
    use rstest::rstest;

    use super::*;

    fn new_tree() -> Tree {
        let mut tree = Tree::new();
        tree.insert(ROOT, Node::Root);
        tree
    }

    fn call(tree: &mut Tree, parent: u64, i: u64, name: &str) -> u64 {
        let key = tree.insert_child(
            parent,
            i,
            Node::Expr {
                kind: ExprKind::Call,
                operands: 1,
            },
        );
        tree.insert_child(key, 0, Node::leaf(name));
        key
    }

    fn field(tree: &mut Tree, parent: u64, i: u64, name: &str, ty: &str) -> u64 {
        let key = tree.insert_child(parent, i, Node::TypedIdent(FieldKind::Normal));
        tree.insert_child(key, 0, Node::leaf(name));
        let root = tree.insert_child(key, 1, Node::TypeRoot);
        tree.insert_child(root, 0, Node::leaf(ty));
        key
    }

    fn assign_row(tree: &mut Tree, parent: u64, i: u64, kind: AssignKind, elems: &[&str]) -> u64 {
        let key = tree.insert_child(
            parent,
            i,
            Node::Assign {
                kind,
                elems: elems.len() as u64,
            },
        );
        for (j, text) in elems.iter().enumerate() {
            tree.insert_child(key, j as u64, Node::leaf(*text));
        }
        key
    }

    #[test]
    fn test_render_file() {
        let mut tree = new_tree();
        let file = tree.insert_child(ROOT, 0, Node::File);
        let pkg = tree.insert_child(file, 0, Node::Package(PackageKind::Normal));
        tree.insert_child(pkg, 0, Node::leaf("main"));
        let import = tree.insert_child(file, 1, Node::Import);
        tree.insert_child(import, 0, Node::leaf("\"fmt\""));
        let func = tree.insert_child(
            file,
            2,
            Node::Func {
                receiver: false,
                params: 0,
            },
        );
        tree.insert_child(func, 0, Node::leaf("f"));
        let body = tree.insert_child(
            func,
            1,
            Node::Block {
                kind: BlockKind::Plain,
                header: 0,
            },
        );
        let ret = tree.insert_child(body, 0, Node::Return);
        tree.insert_child(ret, 0, Node::leaf("a"));
        tree.insert_child(ret, 1, Node::leaf("b"));

        assert_eq!(
            render(&tree, ROOT).unwrap(),
            "package main\nimport \"fmt\"\nfunc f(){\nreturn a, b\n}\n\n"
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut tree = new_tree();
        let file = tree.insert_child(ROOT, 0, Node::File);
        let pkg = tree.insert_child(file, 0, Node::Package(PackageKind::Normal));
        tree.insert_child(pkg, 0, Node::leaf("main"));
        call(&mut tree, file, 1, "init");

        let first = render(&tree, ROOT).unwrap();
        let second = render(&tree, ROOT).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_tree_renders_nothing() {
        assert_eq!(render(&Tree::new(), ROOT).unwrap(), "");
    }

    #[test]
    fn test_else_if_chain() {
        let mut tree = new_tree();
        let outer = tree.insert_child(
            ROOT,
            0,
            Node::Block {
                kind: BlockKind::Plain,
                header: 0,
            },
        );
        for (i, (cond, callee)) in [(Some("c1"), "f1"), (Some("c2"), "f2"), (None, "f3")]
            .into_iter()
            .enumerate()
        {
            let kind = if cond.is_some() {
                BlockKind::IfElse
            } else {
                BlockKind::Plain
            };
            let header = u64::from(cond.is_some());
            let block = tree.insert_child(outer, i as u64, Node::Block { kind, header });
            let mut at = 0;
            if let Some(cond) = cond {
                tree.insert_child(block, 0, Node::leaf(cond));
                at = 1;
            }
            call(&mut tree, block, at, callee);
        }

        assert_eq!(
            render(&tree, outer).unwrap(),
            "{\nif c1{\nf1()\n} else\nif c2{\nf2()\n} else\n{\nf3()\n}\n}"
        );
    }

    #[test]
    fn test_keyed_composite() {
        let mut tree = new_tree();
        let lit = tree.insert_child(
            ROOT,
            0,
            Node::Expr {
                kind: ExprKind::Composed,
                operands: 3,
            },
        );
        for (i, (key, value)) in [("k1", "v1"), ("k2", "v2"), ("k3", "v3")].into_iter().enumerate() {
            let pair = tree.insert_child(
                lit,
                i as u64,
                Node::Expr {
                    kind: ExprKind::KeyVal,
                    operands: 2,
                },
            );
            tree.insert_child(pair, 0, Node::leaf(key));
            tree.insert_child(pair, 1, Node::leaf(value));
        }

        assert_eq!(render(&tree, lit).unwrap(), "{k1: v1, k2: v2, k3: v3}");
    }

    #[test]
    fn test_comment_placement() {
        let mut tree = new_tree();
        let file = tree.insert_child(ROOT, 0, Node::File);
        call(&mut tree, file, 0, "f");
        let tail = tree.insert_child(file, 1, Node::Comment(CommentKind::Ender));
        tree.insert_child(tail, 0, Node::leaf("// tail"));
        let separate = tree.insert_child(file, 2, Node::Comment(CommentKind::Separate));
        tree.insert_child(separate, 0, Node::leaf("// sep"));

        assert_eq!(render(&tree, file).unwrap(), "f()// tail\n\n// sep\n");
    }

    #[test]
    fn test_method_with_receiver() {
        let mut tree = new_tree();
        let func = tree.insert_child(
            ROOT,
            0,
            Node::Func {
                receiver: true,
                params: 0,
            },
        );
        tree.insert_child(func, 0, Node::leaf("M"));
        field(&mut tree, func, 1, "r", "T");
        tree.insert_child(
            func,
            2,
            Node::Block {
                kind: BlockKind::Plain,
                header: 0,
            },
        );

        assert_eq!(render(&tree, func).unwrap(), "func (r T) M(){\n}\n");
    }

    #[test]
    fn test_func_params_and_results() {
        let mut tree = new_tree();
        let func = tree.insert_child(
            ROOT,
            0,
            Node::Func {
                receiver: false,
                params: 1,
            },
        );
        tree.insert_child(func, 0, Node::leaf("f"));
        field(&mut tree, func, 1, "a", "int");
        let result = tree.insert_child(func, 2, Node::TypedIdent(FieldKind::Normal));
        let root = tree.insert_child(result, 0, Node::TypeRoot);
        tree.insert_child(root, 0, Node::leaf("int"));
        tree.insert_child(
            func,
            3,
            Node::Block {
                kind: BlockKind::Plain,
                header: 0,
            },
        );

        assert_eq!(render(&tree, func).unwrap(), "func f(a int)(int){\n}\n");
    }

    #[test]
    fn test_type_struct() {
        let mut tree = new_tree();
        let def = tree.insert_child(ROOT, 0, Node::TypeDef(TypeDefKind::Normal));
        tree.insert_child(def, 0, Node::leaf("T"));
        let root = tree.insert_child(def, 1, Node::TypeRoot);
        let st = tree.insert_child(root, 0, Node::Struct);
        field(&mut tree, st, 0, "a", "int");

        assert_eq!(render(&tree, def).unwrap(), "type T struct{\na int\n}\n");
    }

    #[test]
    fn test_type_alias() {
        let mut tree = new_tree();
        let def = tree.insert_child(ROOT, 0, Node::TypeDef(TypeDefKind::Alias));
        tree.insert_child(def, 0, Node::leaf("T"));
        let root = tree.insert_child(def, 1, Node::TypeRoot);
        tree.insert_child(root, 0, Node::leaf("int"));

        assert_eq!(render(&tree, def).unwrap(), "type T = int\n");
    }

    #[test]
    fn test_tagged_struct_field() {
        let mut tree = new_tree();
        let fld = tree.insert_child(ROOT, 0, Node::TypedIdent(FieldKind::Tagged));
        tree.insert_child(fld, 0, Node::leaf("a"));
        let root = tree.insert_child(fld, 1, Node::TypeRoot);
        tree.insert_child(root, 0, Node::leaf("int"));
        tree.insert_child(fld, 2, Node::leaf("`json:\"a\"`"));

        assert_eq!(render(&tree, fld).unwrap(), "a int `json:\"a\"`");
    }

    #[test]
    fn test_variadic_param() {
        let mut tree = new_tree();
        let fld = tree.insert_child(ROOT, 0, Node::TypedIdent(FieldKind::Ellipsis));
        tree.insert_child(fld, 0, Node::leaf("xs"));
        let root = tree.insert_child(fld, 1, Node::TypeRoot);
        tree.insert_child(root, 0, Node::leaf("[]int"));

        assert_eq!(render(&tree, fld).unwrap(), "xs ...[]int");
    }

    #[test]
    fn test_interface_method() {
        let mut tree = new_tree();
        let iface = tree.insert_child(ROOT, 0, Node::Interface);
        let method = tree.insert_child(iface, 0, Node::Method { params: 1 });
        let name = tree.insert_child(method, 0, Node::TypedIdent(FieldKind::Normal));
        tree.insert_child(name, 0, Node::leaf("Foo"));
        field(&mut tree, method, 1, "x", "int");

        assert_eq!(render(&tree, iface).unwrap(), "interface{\nFoo (x int)\n}");
    }

    #[test]
    fn test_import_group() {
        let mut tree = new_tree();
        let group = tree.insert_child(ROOT, 0, Node::ImportGroup);
        let plain = tree.insert_child(group, 0, Node::Import);
        tree.insert_child(plain, 0, Node::leaf("\"fmt\""));
        let named = tree.insert_child(group, 1, Node::Import);
        tree.insert_child(named, 0, Node::leaf("q"));
        tree.insert_child(named, 1, Node::leaf("\"x/y\""));

        assert_eq!(
            render(&tree, group).unwrap(),
            "import (\n\"fmt\"\nq \"x/y\"\n)"
        );
    }

    #[test]
    fn test_var_single_row() {
        let mut tree = new_tree();
        let def = tree.insert_child(ROOT, 0, Node::VarDef(VarDefKind::Var));
        assign_row(&mut tree, def, 0, AssignKind::Eq, &["x", "1"]);

        assert_eq!(render(&tree, def).unwrap(), "var x = 1");
    }

    #[test]
    fn test_var_group() {
        let mut tree = new_tree();
        let def = tree.insert_child(ROOT, 0, Node::VarDef(VarDefKind::Const));
        assign_row(&mut tree, def, 0, AssignKind::Eq, &["x", "1"]);
        assign_row(&mut tree, def, 1, AssignKind::Eq, &["y", "2"]);

        assert_eq!(render(&tree, def).unwrap(), "const (\nx = 1\ny = 2\n)\n");
    }

    #[test]
    fn test_var_empty_group() {
        let mut tree = new_tree();
        let def = tree.insert_child(ROOT, 0, Node::VarDef(VarDefKind::Var));

        assert_eq!(render(&tree, def).unwrap(), "var ()");
    }

    #[test]
    fn test_switch_cases() {
        let mut tree = new_tree();
        let switch = tree.insert_child(
            ROOT,
            0,
            Node::Block {
                kind: BlockKind::Switch,
                header: 1,
            },
        );
        tree.insert_child(switch, 0, Node::leaf("x"));
        let case = tree.insert_child(
            switch,
            1,
            Node::Block {
                kind: BlockKind::Case,
                header: 2,
            },
        );
        tree.insert_child(case, 0, Node::leaf("1"));
        tree.insert_child(case, 1, Node::leaf("2"));
        call(&mut tree, case, 2, "f");
        let default = tree.insert_child(
            switch,
            2,
            Node::Block {
                kind: BlockKind::Default,
                header: 0,
            },
        );
        call(&mut tree, default, 0, "g");

        assert_eq!(
            render(&tree, switch).unwrap(),
            "switch x{\ncase 1, 2:\nf()\n\ndefault:\ng()\n\n}"
        );
    }

    #[test]
    fn test_select() {
        let mut tree = new_tree();
        let select = tree.insert_child(
            ROOT,
            0,
            Node::Block {
                kind: BlockKind::Select,
                header: 0,
            },
        );
        let comm = tree.insert_child(
            select,
            0,
            Node::Block {
                kind: BlockKind::Communicate,
                header: 1,
            },
        );
        let send = tree.insert_child(
            comm,
            0,
            Node::Expr {
                kind: ExprKind::Arrow,
                operands: 2,
            },
        );
        tree.insert_child(send, 0, Node::leaf("ch"));
        tree.insert_child(send, 1, Node::leaf("v"));
        call(&mut tree, comm, 1, "f");
        let default = tree.insert_child(
            select,
            1,
            Node::Block {
                kind: BlockKind::CommunicateDefault,
                header: 0,
            },
        );
        call(&mut tree, default, 0, "g");

        assert_eq!(
            render(&tree, select).unwrap(),
            "select {\ncase ch <- v:\nf()\n\ndefault:\ng()\n\n}"
        );
    }

    #[test]
    fn test_for_range() {
        let mut tree = new_tree();
        let block = tree.insert_child(
            ROOT,
            0,
            Node::Block {
                kind: BlockKind::For,
                header: 1,
            },
        );
        assign_row(&mut tree, block, 0, AssignKind::RangeDefine, &["k", "v", "m"]);
        call(&mut tree, block, 1, "f");

        assert_eq!(render(&tree, block).unwrap(), "for k, v := range m {\nf()\n}");
    }

    #[test]
    fn test_slice_omitted_low_bound() {
        let mut tree = new_tree();
        let slice = tree.insert_child(
            ROOT,
            0,
            Node::Expr {
                kind: ExprKind::Slice,
                operands: 3,
            },
        );
        tree.insert_child(slice, 0, Node::leaf("a"));
        tree.insert_child(slice, 1, Node::Empty);
        tree.insert_child(slice, 2, Node::leaf("n"));

        assert_eq!(render(&tree, slice).unwrap(), "a[:n]");
    }

    #[test]
    fn test_closure() {
        let mut tree = new_tree();
        let closure = tree.insert_child(ROOT, 0, Node::Closure { params: 1 });
        field(&mut tree, closure, 0, "a", "int");
        let result = tree.insert_child(closure, 1, Node::TypedIdent(FieldKind::Normal));
        let root = tree.insert_child(result, 0, Node::TypeRoot);
        tree.insert_child(root, 0, Node::leaf("int"));
        let body = tree.insert_child(
            closure,
            2,
            Node::Block {
                kind: BlockKind::Plain,
                header: 0,
            },
        );
        let ret = tree.insert_child(body, 0, Node::Return);
        tree.insert_child(ret, 0, Node::leaf("a"));

        assert_eq!(
            render(&tree, closure).unwrap(),
            "func(a int)(int){\nreturn a\n}"
        );
    }

    #[test]
    fn test_statements() {
        let cases: Vec<(Node, &[&str], &str)> = vec![
            (Node::Label(LabelKind::Label), &["loop"], "loop:"),
            (Node::Label(LabelKind::Goto), &["loop"], "goto loop"),
            (Node::Label(LabelKind::Break), &["out"], "break out"),
            (Node::IncDec(IncDecKind::Inc), &["i"], "i++"),
            (Node::IncDec(IncDecKind::Dec), &["j"], "j--"),
            (Node::Branch(BranchKind::Fallthrough), &[], "fallthrough"),
            (Node::Branch(BranchKind::Semi), &[], ";"),
            (Node::Return, &[], "return"),
        ];
        for (node, children, expected) in cases {
            let mut tree = new_tree();
            let key = tree.insert_child(ROOT, 0, node);
            for (i, text) in children.iter().enumerate() {
                tree.insert_child(key, i as u64, Node::leaf(*text));
            }
            assert_eq!(render(&tree, key).unwrap(), expected);
        }
    }

    #[test]
    fn test_go_defer() {
        for (kind, expected) in [(GoDeferKind::Go, "go f()"), (GoDeferKind::Defer, "defer f()")] {
            let mut tree = new_tree();
            let stmt = tree.insert_child(ROOT, 0, Node::GoDefer(kind));
            call(&mut tree, stmt, 0, "f");
            assert_eq!(render(&tree, stmt).unwrap(), expected);
        }
    }

    #[rstest]
    #[case(ExprKind::Brackets, 1, &["x"], "(x)")]
    #[case(ExprKind::Minus, 1, &["x"], "-x")]
    #[case(ExprKind::Minus, 2, &["a", "b"], "a - b")]
    #[case(ExprKind::Not, 1, &["ok"], "!ok")]
    #[case(ExprKind::Mul, 1, &["p"], "*p")]
    #[case(ExprKind::BitAnd, 1, &["v"], "&v")]
    #[case(ExprKind::OrOr, 2, &["a", "b"], "a || b")]
    #[case(ExprKind::AndNot, 2, &["a", "b"], "a &^ b")]
    #[case(ExprKind::Shl, 2, &["a", "b"], "a << b")]
    #[case(ExprKind::Dot, 3, &["a", "b", "c"], "a.b.c")]
    #[case(ExprKind::Call, 1, &["f"], "f()")]
    #[case(ExprKind::Call, 3, &["f", "a", "b"], "f(a,b)")]
    #[case(ExprKind::CallVariadic, 2, &["f", "xs"], "f(xs...)")]
    #[case(ExprKind::Index, 2, &["a", "i"], "a[i]")]
    #[case(ExprKind::Slice, 3, &["a", "lo", "hi"], "a[lo:hi]")]
    #[case(ExprKind::Slice, 2, &["a", "lo"], "a[lo:]")]
    #[case(ExprKind::Composite, 1, &["T"], "T{}")]
    #[case(ExprKind::Composite, 3, &["T", "1", "2"], "T{1, 2}")]
    #[case(ExprKind::Composed, 0, &[], "{}")]
    #[case(ExprKind::Composed, 1, &["v"], "{v}")]
    #[case(ExprKind::TypeAssert, 2, &["x", "T"], "x.(T)")]
    #[case(ExprKind::TypeAssert, 1, &["x"], "x.(type)")]
    #[case(ExprKind::MapType, 2, &["k", "v"], "map[k]v")]
    #[case(ExprKind::SliceType, 2, &["10", "int"], "[10]int")]
    #[case(ExprKind::ArrayType, 0, &["int"], "[]int")]
    #[case(ExprKind::Chan, 1, &["T"], "chan T")]
    #[case(ExprKind::SendChan, 1, &["T"], "chan<- T")]
    #[case(ExprKind::RecvChan, 1, &["T"], "<-chan T")]
    #[case(ExprKind::Arrow, 1, &["ch"], "<-ch")]
    #[case(ExprKind::Arrow, 2, &["ch", "v"], "ch <- v")]
    #[case(ExprKind::Identifier, 1, &["x"], "x")]
    fn test_expr_shapes(
        #[case] kind: ExprKind,
        #[case] operands: u64,
        #[case] children: &[&str],
        #[case] expected: &str,
    ) {
        let mut tree = new_tree();
        let expr = tree.insert_child(ROOT, 0, Node::Expr { kind, operands });
        for (i, text) in children.iter().enumerate() {
            tree.insert_child(expr, i as u64, Node::leaf(*text));
        }
        assert_eq!(render(&tree, expr).unwrap(), expected);
    }

    #[rstest]
    #[case(AssignKind::Eq, &["a", "b", "c", "d"], "a, b = c, d")]
    #[case(AssignKind::Define, &["x", "1"], "x := 1")]
    #[case(AssignKind::Add, &["x", "1"], "x += 1")]
    #[case(AssignKind::Shr, &["x", "2"], "x >>= 2")]
    #[case(AssignKind::OneRhsDefine, &["a", "b", "r"], "a, b := r")]
    #[case(AssignKind::OneRhsEq, &["a", "b", "r"], "a, b = r")]
    #[case(AssignKind::RangeEq, &["k", "v", "m"], "k, v = range m")]
    #[case(AssignKind::RangeDefine, &["k", "v", "m"], "k, v := range m")]
    #[case(AssignKind::IotaTail, &["a", "b"], "a, b")]
    #[case(AssignKind::TypeTail, &["a", "b", "int"], "a, b int")]
    fn test_assign_rows(
        #[case] kind: AssignKind,
        #[case] elems: &[&str],
        #[case] expected: &str,
    ) {
        let mut tree = new_tree();
        let row = assign_row(&mut tree, ROOT, 0, kind, elems);
        assert_eq!(render(&tree, row).unwrap(), expected);
    }

    #[test]
    fn test_raw_string_leaf_kept_verbatim() {
        // Trailing spaces and a CRLF inside a raw string literal are source
        // text, not formatting, and must come back out untouched.
        let mut tree = new_tree();
        let row = assign_row(&mut tree, ROOT, 0, AssignKind::Define, &["s", "`a   \r\nb`"]);
        assert_eq!(render(&tree, row).unwrap(), "s := `a   \r\nb`");
    }

    #[test]
    fn test_separator_spaces_still_trimmed() {
        let mut tree = new_tree();
        let def = tree.insert_child(ROOT, 0, Node::VarDef(VarDefKind::Var));
        assign_row(&mut tree, def, 0, AssignKind::Eq, &["x", "1"]);
        assign_row(&mut tree, def, 1, AssignKind::Eq, &["y", "2"]);

        let out = render(&tree, def).unwrap();
        assert_eq!(out, "var (\nx = 1\ny = 2\n)\n");
        assert!(!out.contains(" \n"));
    }

    #[test]
    fn test_too_deep() {
        let mut tree = new_tree();
        let mut parent = ROOT;
        for _ in 0..600 {
            parent = tree.insert_child(
                parent,
                0,
                Node::Expr {
                    kind: ExprKind::Brackets,
                    operands: 1,
                },
            );
        }
        assert!(matches!(
            render(&tree, ROOT),
            Err(RenderError::TooDeep { .. })
        ));
    }
}
