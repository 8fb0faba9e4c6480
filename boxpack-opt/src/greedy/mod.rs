use log::debug;

/// Orderings deciding which item is offered next
pub mod ordering;

/// Placement of a single item inside a single container
pub mod placers;

/// Container selection and container bookkeeping on top of a [`placers::Placer`]
pub mod bin_packer;

/// Decides which item is offered to the packing strategy next.
/// May inspect the current (partial) solution to do so.
pub trait OrderingStrategy<I, S> {
    /// Returns the next item to pack, `None` once all items were handed out
    fn next_item(&mut self, solution: &S) -> Option<I>;
}

/// Decides where an offered item is placed.
pub trait PackingStrategy<I> {
    type Solution;

    /// Places `item` somewhere in the solution, opening new room if needed.
    /// Never fails: an item that fits nowhere else gets a fresh container.
    fn pack_item(&mut self, item: I);

    fn solution(&self) -> &Self::Solution;
}

/// Constructs a solution one item at a time, by asking `O` for the next item and letting `P` place it.
pub struct GreedyPacker<I, O, P> {
    order: O,
    packer: P,
    next: Option<I>,
    n_packed: usize,
}

impl<I, O, P> GreedyPacker<I, O, P>
where
    P: PackingStrategy<I>,
    O: OrderingStrategy<I, P::Solution>,
{
    /// `order` and `packer` are expected to be freshly constructed for the same instance.
    pub fn new(mut order: O, packer: P) -> Self {
        let next = order.next_item(packer.solution());
        Self {
            order,
            packer,
            next,
            n_packed: 0,
        }
    }

    /// Packs all remaining items
    pub fn optimize(&mut self) -> &P::Solution {
        self.optimize_step(usize::MAX).0
    }

    /// Packs at most `limit` items. Also returns whether all items have been packed.
    pub fn optimize_step(&mut self, limit: usize) -> (&P::Solution, bool) {
        let mut steps = 0;
        while steps < limit {
            let Some(item) = self.next.take() else {
                break;
            };
            self.packer.pack_item(item);
            self.next = self.order.next_item(self.packer.solution());
            self.n_packed += 1;
            steps += 1;
        }
        debug!("[GREEDY] {steps} items packed, {} in total", self.n_packed);

        (self.packer.solution(), self.next.is_none())
    }

    pub fn n_packed(&self) -> usize {
        self.n_packed
    }

    pub fn into_packer(self) -> P {
        self.packer
    }
}
