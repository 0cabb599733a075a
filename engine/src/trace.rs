use std::{
    cell::RefCell,
    ops::{Add, Mul, Sub},
    rc::Rc,
};

use fnv::FnvHashMap;

use crate::integer::Integer;

pub type NodeId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Gt,
    Ge,
    Lt,
}

impl CmpOp {
    #[inline]
    pub fn apply(self, a: i64, b: i64) -> i64 {
        match self {
            CmpOp::Gt => (a > b) as i64,
            CmpOp::Ge => (a >= b) as i64,
            CmpOp::Lt => (a < b) as i64,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Element `index` of argument `param`.
    Input { param: usize, index: usize },
    Const(i64),
    Add(NodeId, NodeId),
    Sub(NodeId, NodeId),
    Mul(NodeId, NodeId),
    Cmp(CmpOp, NodeId, NodeId),
}

impl Op {
    fn operands(&self) -> Option<(NodeId, NodeId)> {
        match *self {
            Op::Input { .. } | Op::Const(_) => None,
            Op::Add(a, b) | Op::Sub(a, b) | Op::Mul(a, b) | Op::Cmp(_, a, b) => Some((a, b)),
        }
    }
}

/// Data-flow graph of a traced circuit. Nodes are stored in topological
/// order: operands always precede the node using them.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Op>,
    consts: FnvHashMap<i64, NodeId>,
}

impl Graph {
    pub fn nodes(&self) -> &[Op] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn constant(&self, id: NodeId) -> Option<i64> {
        match self.nodes[id] {
            Op::Const(c) => Some(c),
            _ => None,
        }
    }

    /// Appends `op`, interning constants and folding operations whose
    /// operands are all constants.
    pub fn push(&mut self, op: Op) -> NodeId {
        if let Some((Some(ca), Some(cb))) = op
            .operands()
            .map(|(a, b)| (self.constant(a), self.constant(b)))
        {
            let folded: i64 = match op {
                Op::Add(..) => ca.wrapping_add(cb),
                Op::Sub(..) => ca.wrapping_sub(cb),
                Op::Mul(..) => ca.wrapping_mul(cb),
                Op::Cmp(cmp, ..) => cmp.apply(ca, cb),
                Op::Input { .. } | Op::Const(_) => unreachable!(),
            };
            return self.push(Op::Const(folded));
        }

        if let Op::Const(c) = op {
            if let Some(id) = self.consts.get(&c) {
                return *id;
            }
        }

        let id: NodeId = self.nodes.len();
        self.nodes.push(op);
        if let Op::Const(c) = op {
            self.consts.insert(c, id);
        }
        id
    }

    /// Drops every node `output` does not depend on. Returns the pruned graph
    /// and the new id of `output`.
    pub fn prune(&self, output: NodeId) -> (Graph, NodeId) {
        let mut live: Vec<bool> = vec![false; self.nodes.len()];
        live[output] = true;
        for id in (0..=output).rev() {
            if !live[id] {
                continue;
            }
            if let Some((a, b)) = self.nodes[id].operands() {
                live[a] = true;
                live[b] = true;
            }
        }

        let mut remap: Vec<NodeId> = vec![usize::MAX; self.nodes.len()];
        let mut pruned: Graph = Graph::default();
        for (id, op) in self.nodes.iter().enumerate() {
            if !live[id] {
                continue;
            }
            let renamed: Op = match *op {
                Op::Add(a, b) => Op::Add(remap[a], remap[b]),
                Op::Sub(a, b) => Op::Sub(remap[a], remap[b]),
                Op::Mul(a, b) => Op::Mul(remap[a], remap[b]),
                Op::Cmp(cmp, a, b) => Op::Cmp(cmp, remap[a], remap[b]),
                other => other,
            };
            remap[id] = pruned.nodes.len();
            if let Op::Const(c) = renamed {
                pruned.consts.insert(c, remap[id]);
            }
            pruned.nodes.push(renamed);
        }
        (pruned, remap[output])
    }

    /// Plain evaluation of every node. Arithmetic saturates so that
    /// out-of-range intermediate values show up as oversized widths.
    pub fn eval(&self, args: &[Vec<i64>]) -> Vec<i64> {
        let mut values: Vec<i64> = Vec::with_capacity(self.nodes.len());
        for op in self.nodes.iter() {
            let v: i64 = match *op {
                Op::Input { param, index } => args[param][index],
                Op::Const(c) => c,
                Op::Add(a, b) => values[a].saturating_add(values[b]),
                Op::Sub(a, b) => values[a].saturating_sub(values[b]),
                Op::Mul(a, b) => values[a].saturating_mul(values[b]),
                Op::Cmp(cmp, a, b) => cmp.apply(values[a], values[b]),
            };
            values.push(v);
        }
        values
    }
}

/// A value produced while tracing a circuit: a handle on a node of the
/// graph under construction.
#[derive(Clone, Debug)]
pub struct Traced {
    graph: Rc<RefCell<Graph>>,
    id: NodeId,
}

impl Traced {
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn binary(&self, rhs: &Traced, op: fn(NodeId, NodeId) -> Op) -> Traced {
        debug_assert!(
            Rc::ptr_eq(&self.graph, &rhs.graph),
            "operands belong to different traces"
        );
        let id: NodeId = self.graph.borrow_mut().push(op(self.id, rhs.id));
        Traced {
            graph: self.graph.clone(),
            id,
        }
    }
}

impl Add for Traced {
    type Output = Traced;
    fn add(self, rhs: Traced) -> Traced {
        self.binary(&rhs, Op::Add)
    }
}

impl Sub for Traced {
    type Output = Traced;
    fn sub(self, rhs: Traced) -> Traced {
        self.binary(&rhs, Op::Sub)
    }
}

impl Mul for Traced {
    type Output = Traced;
    fn mul(self, rhs: Traced) -> Traced {
        self.binary(&rhs, Op::Mul)
    }
}

impl Integer for Traced {
    fn constant_like(&self, value: i64) -> Self {
        let id: NodeId = self.graph.borrow_mut().push(Op::Const(value));
        Traced {
            graph: self.graph.clone(),
            id,
        }
    }

    fn is_gt(&self, rhs: &Self) -> Self {
        self.binary(rhs, |a, b| Op::Cmp(CmpOp::Gt, a, b))
    }

    fn is_ge(&self, rhs: &Self) -> Self {
        self.binary(rhs, |a, b| Op::Cmp(CmpOp::Ge, a, b))
    }

    fn is_lt(&self, rhs: &Self) -> Self {
        self.binary(rhs, |a, b| Op::Cmp(CmpOp::Lt, a, b))
    }
}

/// Traces `f` on symbolic arguments of the given lengths.
pub fn trace<F>(shapes: &[usize], f: F) -> (Graph, NodeId)
where
    F: FnOnce(&[Vec<Traced>]) -> Traced,
{
    let graph: Rc<RefCell<Graph>> = Rc::new(RefCell::new(Graph::default()));
    let args: Vec<Vec<Traced>> = shapes
        .iter()
        .enumerate()
        .map(|(param, len)| {
            (0..*len)
                .map(|index| Traced {
                    graph: graph.clone(),
                    id: graph.borrow_mut().push(Op::Input { param, index }),
                })
                .collect()
        })
        .collect();
    let output: NodeId = f(&args).id;
    let traced: Graph = graph.borrow().clone();
    (traced, output)
}
