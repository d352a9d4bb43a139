//! Red-black tree variant of [`PriceLevels`].
//!
//! Grounded in the reference implementation's `RBTreePriceLevels` (a
//! swap from `SortedDict` to `FastRBTree`, with explicit `.min_key()`/
//! `.max_key()` accessors for best bid/ask). Implemented here as an
//! arena (`Vec<Option<Node>>`, `usize` links) rather than a pointer-based
//! tree, since that's the standard idiomatic-Rust way to write a
//! balanced tree without `unsafe`. Exists to compare a balanced tree's
//! constant factors against `BTreeMap`'s B-tree node layout.

use super::{in_range, AddOrderOutcome, PriceLevels};
use crate::price_level::PriceLevel;
use crate::types::{Order, Price, Side};

const NIL: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

struct Node<L> {
    key: i64,
    level: L,
    color: Color,
    parent: usize,
    left: usize,
    right: usize,
}

/// One arena-backed red-black tree, used for one side (buy or sell).
struct RbTree<L> {
    nodes: Vec<Option<Node<L>>>,
    free: Vec<usize>,
    root: usize,
}

impl<L: PriceLevel> RbTree<L> {
    fn new() -> Self {
        RbTree {
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

    fn alloc(&mut self, key: i64, level: L) -> usize {
        let node = Node {
            key,
            level,
            color: Color::Red,
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

    fn rotate_left(&mut self, x: usize) {
        let y = self.node(x).right;
        self.node_mut(x).right = self.node(y).left;
        if self.node(y).left != NIL {
            let yl = self.node(y).left;
            self.node_mut(yl).parent = x;
        }
        self.node_mut(y).parent = self.node(x).parent;
        let parent = self.node(x).parent;
        if parent == NIL {
            self.root = y;
        } else if x == self.node(parent).left {
            self.node_mut(parent).left = y;
        } else {
            self.node_mut(parent).right = y;
        }
        self.node_mut(y).left = x;
        self.node_mut(x).parent = y;
    }

    fn rotate_right(&mut self, x: usize) {
        let y = self.node(x).left;
        self.node_mut(x).left = self.node(y).right;
        if self.node(y).right != NIL {
            let yr = self.node(y).right;
            self.node_mut(yr).parent = x;
        }
        self.node_mut(y).parent = self.node(x).parent;
        let parent = self.node(x).parent;
        if parent == NIL {
            self.root = y;
        } else if x == self.node(parent).right {
            self.node_mut(parent).right = y;
        } else {
            self.node_mut(parent).left = y;
        }
        self.node_mut(y).right = x;
        self.node_mut(x).parent = y;
    }

    fn color_of(&self, index: usize) -> Color {
        if index == NIL { Color::Black } else { self.node(index).color }
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
        self.insert_fixup(z);
        z
    }

    fn insert_fixup(&mut self, mut z: usize) {
        while self.color_of(self.node(z).parent) == Color::Red {
            let parent = self.node(z).parent;
            let grandparent = self.node(parent).parent;
            if parent == self.node(grandparent).left {
                let uncle = self.node(grandparent).right;
                if self.color_of(uncle) == Color::Red {
                    self.node_mut(parent).color = Color::Black;
                    self.node_mut(uncle).color = Color::Black;
                    self.node_mut(grandparent).color = Color::Red;
                    z = grandparent;
                } else {
                    if z == self.node(parent).right {
                        z = parent;
                        self.rotate_left(z);
                    }
                    let parent = self.node(z).parent;
                    let grandparent = self.node(parent).parent;
                    self.node_mut(parent).color = Color::Black;
                    self.node_mut(grandparent).color = Color::Red;
                    self.rotate_right(grandparent);
                }
            } else {
                let uncle = self.node(grandparent).left;
                if self.color_of(uncle) == Color::Red {
                    self.node_mut(parent).color = Color::Black;
                    self.node_mut(uncle).color = Color::Black;
                    self.node_mut(grandparent).color = Color::Red;
                    z = grandparent;
                } else {
                    if z == self.node(parent).left {
                        z = parent;
                        self.rotate_right(z);
                    }
                    let parent = self.node(z).parent;
                    let grandparent = self.node(parent).parent;
                    self.node_mut(parent).color = Color::Black;
                    self.node_mut(grandparent).color = Color::Red;
                    self.rotate_left(grandparent);
                }
            }
        }
        self.node_mut(self.root).color = Color::Black;
    }

    fn transplant(&mut self, u: usize, v: usize) {
        let parent = self.node(u).parent;
        if parent == NIL {
            self.root = v;
        } else if u == self.node(parent).left {
            self.node_mut(parent).left = v;
        } else {
            self.node_mut(parent).right = v;
        }
        if v != NIL {
            self.node_mut(v).parent = parent;
        }
    }

    fn delete(&mut self, key: i64) -> Option<L> {
        let z = self.search(key);
        if z == NIL {
            return None;
        }
        let mut y = z;
        let mut y_original_color = self.node(y).color;
        let x;
        let x_parent;
        if self.node(z).left == NIL {
            x = self.node(z).right;
            x_parent = self.node(z).parent;
            self.transplant(z, self.node(z).right);
        } else if self.node(z).right == NIL {
            x = self.node(z).left;
            x_parent = self.node(z).parent;
            self.transplant(z, self.node(z).left);
        } else {
            y = self.min_from(self.node(z).right);
            y_original_color = self.node(y).color;
            x = self.node(y).right;
            if self.node(y).parent == z {
                x_parent = y;
                if x != NIL {
                    self.node_mut(x).parent = y;
                }
            } else {
                x_parent = self.node(y).parent;
                self.transplant(y, self.node(y).right);
                let zr = self.node(z).right;
                self.node_mut(y).right = zr;
                self.node_mut(zr).parent = y;
            }
            self.transplant(z, y);
            let zl = self.node(z).left;
            self.node_mut(y).left = zl;
            self.node_mut(zl).parent = y;
            let zc = self.node(z).color;
            self.node_mut(y).color = zc;
        }
        if y_original_color == Color::Black {
            self.delete_fixup(x, x_parent);
        }
        let removed = self.nodes[z].take().expect("dangling tree index");
        self.free.push(z);
        Some(removed.level)
    }

    fn delete_fixup(&mut self, mut x: usize, mut x_parent: usize) {
        while x != self.root && self.color_of(x) == Color::Black {
            if x == self.node(x_parent).left {
                let mut w = self.node(x_parent).right;
                if self.color_of(w) == Color::Red {
                    self.node_mut(w).color = Color::Black;
                    self.node_mut(x_parent).color = Color::Red;
                    self.rotate_left(x_parent);
                    w = self.node(x_parent).right;
                }
                if self.color_of(self.node(w).left) == Color::Black
                    && self.color_of(self.node(w).right) == Color::Black
                {
                    self.node_mut(w).color = Color::Red;
                    x = x_parent;
                    x_parent = self.node(x).parent;
                } else {
                    if self.color_of(self.node(w).right) == Color::Black {
                        let wl = self.node(w).left;
                        self.node_mut(wl).color = Color::Black;
                        self.node_mut(w).color = Color::Red;
                        self.rotate_right(w);
                        w = self.node(x_parent).right;
                    }
                    let parent_color = self.node(x_parent).color;
                    self.node_mut(w).color = parent_color;
                    self.node_mut(x_parent).color = Color::Black;
                    let wr = self.node(w).right;
                    self.node_mut(wr).color = Color::Black;
                    self.rotate_left(x_parent);
                    x = self.root;
                }
            } else {
                let mut w = self.node(x_parent).left;
                if self.color_of(w) == Color::Red {
                    self.node_mut(w).color = Color::Black;
                    self.node_mut(x_parent).color = Color::Red;
                    self.rotate_right(x_parent);
                    w = self.node(x_parent).left;
                }
                if self.color_of(self.node(w).right) == Color::Black
                    && self.color_of(self.node(w).left) == Color::Black
                {
                    self.node_mut(w).color = Color::Red;
                    x = x_parent;
                    x_parent = self.node(x).parent;
                } else {
                    if self.color_of(self.node(w).left) == Color::Black {
                        let wr = self.node(w).right;
                        self.node_mut(wr).color = Color::Black;
                        self.node_mut(w).color = Color::Red;
                        self.rotate_left(w);
                        w = self.node(x_parent).left;
                    }
                    let parent_color = self.node(x_parent).color;
                    self.node_mut(w).color = parent_color;
                    self.node_mut(x_parent).color = Color::Black;
                    let wl = self.node(w).left;
                    self.node_mut(wl).color = Color::Black;
                    self.rotate_right(x_parent);
                    x = self.root;
                }
            }
        }
        if x != NIL {
            self.node_mut(x).color = Color::Black;
        }
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

pub struct RbTreeLevels<L: PriceLevel> {
    bids: RbTree<L>,
    asks: RbTree<L>,
    min_price: Option<Price>,
    max_price: Option<Price>,
}

impl<L: PriceLevel> PriceLevels<L> for RbTreeLevels<L> {
    fn new(min_price: Option<Price>, max_price: Option<Price>) -> Self {
        RbTreeLevels {
            bids: RbTree::new(),
            asks: RbTree::new(),
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
