use hoist_syntax::{DeclId, DeclKind, NodeId, NodeKind, SyntaxTree};

/// Declarations referenced inside `expr`, in traversal order (duplicates kept).
///
/// Lambda bodies are not entered: only the parts of a lambda that can name entities of the
/// enclosing scope contribute (captures, requires clause, template parameters, return type,
/// parameters and attributes).
pub fn referenced_decls(tree: &SyntaxTree, expr: NodeId) -> Vec<DeclId> {
    let mut collector = Collector {
        tree,
        decls: Vec::new(),
    };
    collector.visit(expr);
    collector.decls
}

struct Collector<'a> {
    tree: &'a SyntaxTree,
    decls: Vec<DeclId>,
}

impl Collector<'_> {
    fn visit(&mut self, id: NodeId) {
        match self.tree.kind(id) {
            NodeKind::DeclRef { decl } => {
                // The implicit callee of `[] { ... }()` is not a captured entity.
                if self.tree.decl(*decl).kind != DeclKind::LambdaCallOperator {
                    self.decls.push(*decl);
                }
            }
            NodeKind::Lambda { .. } => {
                self.visit_lambda(id);
                return;
            }
            _ => {}
        }
        let tree = self.tree;
        for &child in tree.children(id) {
            self.visit(child);
        }
    }

    fn visit_lambda(&mut self, lambda: NodeId) {
        let tree = self.tree;
        let children = tree.children(lambda);

        for &child in children {
            match tree.kind(child) {
                NodeKind::LambdaCapture { decl } => self.decls.push(*decl),
                NodeKind::VarDecl {
                    init_capture: true, ..
                } => self.visit(child),
                _ => {}
            }
        }
        if let NodeKind::Lambda { implicit_captures } = tree.kind(lambda) {
            self.decls.extend(implicit_captures.iter().copied());
        }

        let body = tree.lambda_body(lambda);
        let parts: [fn(&NodeKind) -> bool; 5] = [
            |kind| matches!(kind, NodeKind::RequiresClause),
            |kind| matches!(kind, NodeKind::TemplateParam { .. }),
            |kind| matches!(kind, NodeKind::TypeRef),
            |kind| matches!(kind, NodeKind::ParmVarDecl { .. }),
            |kind| matches!(kind, NodeKind::Attribute),
        ];
        for part in parts {
            for &child in children {
                if Some(child) != body && part(tree.kind(child)) {
                    self.visit(child);
                }
            }
        }
    }
}
