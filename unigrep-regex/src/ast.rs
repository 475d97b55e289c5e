use regex_syntax::ast::{self, Ast};

/// What smart case needs to know about a pattern: whether it contains
/// any literal character at all, and whether any such literal is
/// uppercase.
///
/// Only *literals* count. A pattern like `\pL` names uppercase letters
/// without containing one, and `[A-Z]` counts through its range
/// endpoints.
#[derive(Clone, Copy, Debug, Default)]
pub struct CaseAnalysis {
    /// True if and only if a literal uppercase character occurs in the
    /// pattern.
    pub any_uppercase: bool,
    /// True if and only if the pattern contains any literal at all.
    pub any_literal: bool,
}

impl CaseAnalysis {
    /// Both questions answered; nothing further can change.
    fn saturated(&self) -> bool {
        self.any_uppercase && self.any_literal
    }

    fn note_literal(&mut self, lit: &ast::Literal) {
        self.any_literal = true;
        self.any_uppercase = self.any_uppercase || lit.c.is_uppercase();
    }
}

/// Analyze the given abstract syntax for smart case.
pub fn case_analysis(ast: &Ast) -> CaseAnalysis {
    let mut acc = CaseAnalysis::default();
    walk(ast, &mut acc);
    acc
}

/// Parse and analyze a pattern; `None` when it does not parse. This is
/// a convenience for tests.
#[cfg(test)]
pub fn case_analysis_of(pattern: &str) -> Option<CaseAnalysis> {
    use regex_syntax::ast::parse::Parser;
    Parser::new().parse(pattern).ok().map(|ast| case_analysis(&ast))
}

fn walk(ast: &Ast, acc: &mut CaseAnalysis) {
    if acc.saturated() {
        return;
    }
    match *ast {
        Ast::Empty(_)
        | Ast::Flags(_)
        | Ast::Dot(_)
        | Ast::Assertion(_)
        | Ast::Class(ast::Class::Unicode(_))
        | Ast::Class(ast::Class::Perl(_)) => {}
        Ast::Literal(ref lit) => acc.note_literal(lit),
        Ast::Class(ast::Class::Bracketed(ref class)) => {
            walk_class_set(&class.kind, acc)
        }
        Ast::Repetition(ref rep) => walk(&rep.ast, acc),
        Ast::Group(ref group) => walk(&group.ast, acc),
        Ast::Alternation(ref alt) => {
            for branch in &alt.asts {
                walk(branch, acc);
            }
        }
        Ast::Concat(ref concat) => {
            for part in &concat.asts {
                walk(part, acc);
            }
        }
    }
}

fn walk_class_set(set: &ast::ClassSet, acc: &mut CaseAnalysis) {
    if acc.saturated() {
        return;
    }
    match *set {
        ast::ClassSet::Item(ref item) => walk_class_item(item, acc),
        ast::ClassSet::BinaryOp(ref op) => {
            walk_class_set(&op.lhs, acc);
            walk_class_set(&op.rhs, acc);
        }
    }
}

fn walk_class_item(item: &ast::ClassSetItem, acc: &mut CaseAnalysis) {
    if acc.saturated() {
        return;
    }
    match *item {
        ast::ClassSetItem::Empty(_)
        | ast::ClassSetItem::Ascii(_)
        | ast::ClassSetItem::Unicode(_)
        | ast::ClassSetItem::Perl(_) => {}
        ast::ClassSetItem::Literal(ref lit) => acc.note_literal(lit),
        ast::ClassSetItem::Range(ref range) => {
            acc.note_literal(&range.start);
            acc.note_literal(&range.end);
        }
        ast::ClassSetItem::Bracketed(ref class) => {
            walk_class_set(&class.kind, acc)
        }
        ast::ClassSetItem::Union(ref union) => {
            for item in &union.items {
                walk_class_item(item, acc);
            }
        }
    }
}
