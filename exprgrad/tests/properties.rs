//! Property-based tests for exprgrad using proptest.
//!
//! Random expression trees over a few shared variables are checked against
//! the layout rules of [`ComputationOrder`] and against finite differences.

use exprgrad::{cos, sin, ComputationOrder, Expr, Graph, Optimizer, VisitKind};
use proptest::prelude::*;

const NUM_VARS: usize = 3;

/// Expression tree over smooth, everywhere-defined operators.
#[derive(Debug, Clone)]
enum Ast {
    Const(f64),
    Var(usize),
    Add(Box<Ast>, Box<Ast>),
    Sub(Box<Ast>, Box<Ast>),
    Mul(Box<Ast>, Box<Ast>),
    Neg(Box<Ast>),
    Sin(Box<Ast>),
    Cos(Box<Ast>),
}

impl Ast {
    /// Number of occurrences, counting every reuse of a variable.
    fn occurrences(&self) -> usize {
        match self {
            Ast::Const(_) | Ast::Var(_) => 1,
            Ast::Neg(a) | Ast::Sin(a) | Ast::Cos(a) => 1 + a.occurrences(),
            Ast::Add(a, b) | Ast::Sub(a, b) | Ast::Mul(a, b) => {
                1 + a.occurrences() + b.occurrences()
            }
        }
    }

    fn build<'g>(&self, g: &'g Graph, vars: &[Expr<'g>]) -> Expr<'g> {
        match self {
            Ast::Const(c) => g.constant(*c),
            Ast::Var(i) => vars[*i],
            Ast::Add(a, b) => a.build(g, vars) + b.build(g, vars),
            Ast::Sub(a, b) => a.build(g, vars) - b.build(g, vars),
            Ast::Mul(a, b) => a.build(g, vars) * b.build(g, vars),
            Ast::Neg(a) => -a.build(g, vars),
            Ast::Sin(a) => sin(a.build(g, vars)),
            Ast::Cos(a) => cos(a.build(g, vars)),
        }
    }
}

// =============================================================================
// GENERATORS
// =============================================================================

fn arb_ast() -> impl Strategy<Value = Ast> {
    let leaf = prop_oneof![
        (-1.5f64..1.5).prop_map(Ast::Const),
        (0..NUM_VARS).prop_map(Ast::Var),
    ];
    leaf.prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Ast::Add(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Ast::Sub(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Ast::Mul(Box::new(a), Box::new(b))),
            inner.clone().prop_map(|a| Ast::Neg(Box::new(a))),
            inner.clone().prop_map(|a| Ast::Sin(Box::new(a))),
            inner.prop_map(|a| Ast::Cos(Box::new(a))),
        ]
    })
}

fn arb_point() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1.0f64..1.0, NUM_VARS)
}

fn eval_at(ast: &Ast, point: &[f64]) -> f64 {
    let g = Graph::new();
    let vars: Vec<_> = point.iter().map(|&v| g.variable(v).expr()).collect();
    ast.build(&g, &vars).value().unwrap()
}

// =============================================================================
// ORDER LAYOUT
// =============================================================================

proptest! {
    #[test]
    fn order_places_children_before_parents(ast in arb_ast(), point in arb_point()) {
        let g = Graph::new();
        let vars: Vec<_> = point.iter().map(|&v| g.variable(v).expr()).collect();
        let root = ast.build(&g, &vars);
        let order = ComputationOrder::build(root).unwrap();

        prop_assert_eq!(order.root_slot(), order.len() - 1);
        prop_assert_eq!(order.root_node(), Some(root.id()));
        for (i, visit) in order.visits().iter().enumerate() {
            prop_assert_eq!(visit.slot, i);
            for child in visit.children() {
                prop_assert!(child < visit.slot, "child {} after parent {}", child, visit.slot);
            }
            if let VisitKind::Binary { lhs, rhs, .. } = visit.kind {
                prop_assert!(lhs < rhs);
                prop_assert_eq!(rhs, visit.slot - 1);
            }
        }
    }

    #[test]
    fn order_size_counts_every_occurrence(ast in arb_ast()) {
        let g = Graph::new();
        let vars: Vec<_> = (0..NUM_VARS).map(|_| g.variable(0.5).expr()).collect();
        let root = ast.build(&g, &vars);
        let order = ComputationOrder::build(root).unwrap();

        prop_assert_eq!(order.len(), ast.occurrences());
        prop_assert_eq!(ComputationOrder::size_of(root), Some(ast.occurrences()));
        prop_assert!(order.check_shape(root).is_ok());
    }
}

// =============================================================================
// GRADIENTS
// =============================================================================

proptest! {
    #[test]
    fn gradients_match_central_differences(ast in arb_ast(), point in arb_point()) {
        let g = Graph::new();
        let handles: Vec<_> = point.iter().map(|&v| g.variable(v)).collect();
        let vars: Vec<_> = handles.iter().map(|v| v.expr()).collect();
        let root = ast.build(&g, &vars);
        let mut opt = Optimizer::new(root).unwrap();
        let grads = opt.forward_pass().unwrap().compute_gradients().unwrap();

        let h = 1e-5;
        for (i, var) in handles.iter().enumerate() {
            let mut plus = point.clone();
            plus[i] += h;
            let mut minus = point.clone();
            minus[i] -= h;
            let numerical = (eval_at(&ast, &plus) - eval_at(&ast, &minus)) / (2.0 * h);
            let analytic = grads.wrt(var).unwrap_or(0.0);
            prop_assert!(
                (analytic - numerical).abs() <= 1e-4 * (1.0 + numerical.abs()),
                "x{}: analytic {} numerical {} for {:?}", i, analytic, numerical, ast
            );
        }
    }

    #[test]
    fn minimize_moves_each_variable_by_scaled_gradient(
        ast in arb_ast(),
        point in arb_point(),
        rate in 0.001f64..0.5
    ) {
        let g = Graph::new();
        let handles: Vec<_> = point.iter().map(|&v| g.variable(v)).collect();
        let vars: Vec<_> = handles.iter().map(|v| v.expr()).collect();
        let root = ast.build(&g, &vars);
        let mut opt = Optimizer::new(root).unwrap();

        let grads = opt.forward_pass().unwrap().compute_gradients().unwrap();
        for (var, &start) in handles.iter().zip(&point) {
            prop_assert_eq!(var.value(), start);
        }

        opt.forward_pass().unwrap().minimize(rate).unwrap();
        for (var, &start) in handles.iter().zip(&point) {
            let expected = match grads.wrt(var) {
                Some(grad) => start + -rate * grad,
                None => start,
            };
            prop_assert_eq!(var.value(), expected);
        }
    }

    #[test]
    fn evaluation_is_idempotent(ast in arb_ast(), point in arb_point()) {
        let g = Graph::new();
        let vars: Vec<_> = point.iter().map(|&v| g.variable(v).expr()).collect();
        let root = ast.build(&g, &vars);

        let first = root.value().unwrap();
        let second = root.value().unwrap();
        prop_assert_eq!(first.to_bits(), second.to_bits());

        let mut opt = Optimizer::new(root).unwrap();
        opt.forward_pass().unwrap();
        prop_assert_eq!(opt.pre_result().unwrap().to_bits(), first.to_bits());
        prop_assert_eq!(opt.post_result().unwrap().to_bits(), first.to_bits());
    }
}
