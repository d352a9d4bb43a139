//! AVL tree variant of [`PriceLevels`].
//!
//! Grounded in the reference implementation's `AVLTreePriceLevels` (a
//! swap from `FastRBTree` to `FastAVLTree`, reusing the same min/max
//! accessor shape as the red-black variant). Implemented here with the
//! same arena layout as [`super::rb_tree`] but height-balanced instead
//! of color-balanced — the two trees share the node-arena shape
//! deliberately, so the only real difference under benchmarking is the
//! rebalancing discipline.

use super::{in_range, AddOrderOutcome, PriceLevels};
use crate::price_level::PriceLevel;
use crate::types::{Order, Price, Side};

const NIL: usize = usize::MAX;

struct Node<L> {
    key: i64,
    level: L,
    height: i32,
    parent: usize,
    left: usize,
    right: usize,
}

struct AvlTree<L> {
    nodes: Vec<Option<Node<L>>>,
    free: Vec<usize>,
    root: usize,
}

impl<L: PriceLevel> AvlTree<L> {
    fn new() -> Self {
        AvlTree {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NIL,
        }
    }

    fn node(&self, index: usize) -> &Node<L> {
        self.nodes[index].as_ref().expect("dangling tree index")
    }

    fn node_mut(&mut self, index: usize) -> &mut Node<L> {
        self.nodes[index].as_mut().expect("dangling tree index")
    }

    fn height(&self, index: usize) -> i32 {
        if index == NIL { 0 } else { self.node(index).height }
    }

    fn balance_factor(&self, index: usize) -> i32 {
        if index == NIL {
            0
        } else {
            self.height(self.node(index).left) - self.height(self.node(index).right)
        }
    }

    fn update_height(&mut self, index: usize) {
        let h = 1 + self.height(self.node(index).left).max(self.height(self.node(index).right));
        self.node_mut(index).height = h;
    }

    fn alloc(&mut self, key: i64, level: L) -> usize {
        let node = Node {
            key,
            level,
            height: 1,
            parent: NIL,
            left: NIL,
            right: NIL,
        };
        if let Some(index) = self.free.pop() {
            self.nodes[index] = Some(node);
            index
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        }
    }

    fn search(&self, key: i64) -> usize {
        let mut current = self.root;
        while current != NIL {
            let node = self.node(current);
            current = match key.cmp(&node.key) {
                std::cmp::Ordering::Less => node.left,
                std::cmp::Ordering::Greater => node.right,
                std::cmp::Ordering::Equal => return current,
            };
        }
        NIL
    }

    fn min_from(&self, mut index: usize) -> usize {
        while index != NIL && self.node(index).left != NIL {
            index = self.node(index).left;
        }
        index
    }

    fn max_from(&self, mut index: usize) -> usize {
        while index != NIL && self.node(index).right != NIL {
            index = self.node(index).right;
        }
        index
    }

    fn replace_child(&mut self, parent: usize, old: usize, new: usize) {
        if parent == NIL {
            self.root = new;
            return;
        }
        if self.node(parent).left == old {
            self.node_mut(parent).left = new;
        } else {
            self.node_mut(parent).right = new;
        }
    }

    fn rotate_left(&mut self, x: usize) -> usize {
        let y = self.node(x).right;
        let parent = self.node(x).parent;
        self.node_mut(x).right = self.node(y).left;
        if self.node(y).left != NIL {
            let yl = self.node(y).left;
            self.node_mut(yl).parent = x;
        }
        self.node_mut(y).left = x;
        self.node_mut(x).parent = y;
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, y);
        self.update_height(x);
        self.update_height(y);
        y
    }

    fn rotate_right(&mut self, x: usize) -> usize {
        let y = self.node(x).left;
        let parent = self.node(x).parent;
        self.node_mut(x).left = self.node(y).right;
        if self.node(y).right != NIL {
            let yr = self.node(y).right;
            self.node_mut(yr).parent = x;
        }
        self.node_mut(y).right = x;
        self.node_mut(x).parent = y;
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, y);
        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Rebalances `index`, returning the new subtree root.
    fn rebalance(&mut self, index: usize) -> usize {
        self.update_height(index);
        let balance = self.balance_factor(index);
        if balance > 1 {
            if self.balance_factor(self.node(index).left) < 0 {
                let left = self.node(index).left;
                self.rotate_left(left);
            }
            self.rotate_right(index)
        } else if balance < -1 {
            if self.balance_factor(self.node(index).right) > 0 {
                let right = self.node(index).right;
                self.rotate_right(right);
            }
            self.rotate_left(index)
        } else {
            index
        }
    }

    /// Walks from `start` up to the root, rebalancing each ancestor.
    fn retrace(&mut self, mut current: usize) {
        while current != NIL {
            let parent = self.node(current).parent;
            self.rebalance(current);
            current = parent;
        }
    }

    fn insert(&mut self, key: i64, level: L) -> usize {
        let mut parent = NIL;
        let mut current = self.root;
        while current != NIL {
            parent = current;
            current = match key.cmp(&self.node(current).key) {
                std::cmp::Ordering::Less => self.node(current).left,
                _ => self.node(current).right,
            };
        }
        let z = self.alloc(key, level);
        self.node_mut(z).parent = parent;
        if parent == NIL {
            self.root = z;
        } else if key < self.node(parent).key {
            self.node_mut(parent).left = z;
        } else {
            self.node_mut(parent).right = z;
        }
        self.retrace(z);
        z
    }

    fn delete(&mut self, key: i64) -> Option<L> {
        let z = self.search(key);
        if z == NIL {
            return None;
        }
        let parent = self.node(z).parent;
        let retrace_from;
        if self.node(z).left == NIL || self.node(z).right == NIL {
            let child = if self.node(z).left != NIL {
                self.node(z).left
            } else {
                self.node(z).right
            };
            if child != NIL {
                self.node_mut(child).parent = parent;
            }
            self.replace_child(parent, z, child);
            retrace_from = parent;
        } else {
            let successor = self.min_from(self.node(z).right);
            let successor_parent = self.node(successor).parent;
            let successor_right = self.node(successor).right;

            if successor_parent != z {
                self.replace_child(successor_parent, successor, successor_right);
                if successor_right != NIL {
                    self.node_mut(successor_right).parent = successor_parent;
                }
                let zr = self.node(z).right;
                self.node_mut(successor).right = zr;
                self.node_mut(zr).parent = successor;
                retrace_from = successor_parent;
            } else {
                retrace_from = successor;
            }

            let zl = self.node(z).left;
            self.node_mut(successor).left = zl;
            self.node_mut(zl).parent = successor;
            self.node_mut(successor).parent = parent;
            self.replace_child(parent, z, successor);
        }
        self.retrace(retrace_from);
        let removed = self.nodes[z].take().expect("dangling tree index");
        self.free.push(z);
        Some(removed.level)
    }

    fn get(&self, key: i64) -> Option<&L> {
        let index = self.search(key);
        if index == NIL { None } else { Some(&self.node(index).level) }
    }

    fn get_mut(&mut self, key: i64) -> Option<&mut L> {
        let index = self.search(key);
        if index == NIL { None } else { Some(&mut self.node_mut(index).level) }
    }

    fn iter_ascending(&self) -> Vec<i64> {
        let mut out = Vec::new();
        self.inorder(self.root, &mut out);
        out
    }

    fn inorder(&self, index: usize, out: &mut Vec<i64>) {
        if index == NIL {
            return;
        }
        self.inorder(self.node(index).left, out);
        out.push(self.node(index).key);
        self.inorder(self.node(index).right, out);
    }
}

pub struct AvlTreeLevels<L: PriceLevel> {
    bids: AvlTree<L>,
    asks: AvlTree<L>,
    min_price: Option<Price>,
    max_price: Option<Price>,
}

impl<L: PriceLevel> PriceLevels<L> for AvlTreeLevels<L> {
    fn new(min_price: Option<Price>, max_price: Option<Price>) -> Self {
        AvlTreeLevels {
            bids: AvlTree::new(),
            asks: AvlTree::new(),
            min_price,
            max_price,
        }
    }

    fn get_level(&self, side: Side, price: Price) -> Option<&L> {
        match side {
            Side::Buy => self.bids.get(price.0),
            Side::Sell => self.asks.get(price.0),
        }
    }

    fn get_level_mut(&mut self, side: Side, price: Price) -> Option<&mut L> {
        match side {
            Side::Buy => self.bids.get_mut(price.0),
            Side::Sell => self.asks.get_mut(price.0),
        }
    }

    fn add_order(&mut self, order: Order) -> AddOrderOutcome<L::Handle> {
        if !in_range(order.price, self.min_price, self.max_price) {
            return AddOrderOutcome::RejectedOutOfRange;
        }
        let (side, price) = (order.side, order.price);
        let tree = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        if tree.get_mut(price.0).is_none() {
            tree.insert(price.0, L::new(price));
        }
        let level = tree.get_mut(price.0).expect("just inserted");
        let handle = level.append(order);
        AddOrderOutcome::Inserted { handle }
    }

    fn remove_level(&mut self, side: Side, price: Price) {
        match side {
            Side::Buy => {
                self.bids.delete(price.0);
            }
            Side::Sell => {
                self.asks.delete(price.0);
            }
        }
    }

    fn best_ask(&self) -> Option<Price> {
        let index = self.asks.min_from(self.asks.root);
        if index == NIL { None } else { Some(Price(self.asks.node(index).key)) }
    }

    fn best_bid(&self) -> Option<Price> {
        let index = self.bids.max_from(self.bids.root);
        if index == NIL { None } else { Some(Price(self.bids.node(index).key)) }
    }

    fn get_prices(&self, side: Side) -> Box<dyn Iterator<Item = Price> + '_> {
        match side {
            Side::Buy => Box::new(self.bids.iter_ascending().into_iter().rev().map(Price)),
            Side::Sell => Box::new(self.asks.iter_ascending().into_iter().map(Price)),
        }
    }
}
