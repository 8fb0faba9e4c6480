use std::fmt::{Display, Formatter};

use boxpack::entities::{BPInstance, BPProblem, BPSolution, Container};
use boxpack::geometry::Rect;
use boxpack::io::debug::{DebugVisualizer, NoDebug, SvgDebugVisualizer};
use clap::ValueEnum;
use log::info;
use rand::SeedableRng;
use rand::prelude::SmallRng;
use serde::{Deserialize, Serialize};

use crate::config::BPConfig;
use crate::greedy::bin_packer::{ContainerSelection, GenericBinPacker};
use crate::greedy::ordering::{AdaptiveBestFitOrdering, AreaDescOrdering, OnlineOrdering};
use crate::greedy::placers::{CircTouch, NormalPosFirstFit, Placer, SpaceFirstFit};
use crate::greedy::{GreedyPacker, OrderingStrategy};
use crate::ls::local_sequence::LocalSequence;
use crate::ls::relaxed_space::RelaxedSpace;
use crate::ls::repack_space::RepackSpace;
use crate::ls::{LocalSearch, LocalSearchStrategy};

/// Uniform interface over all optimizers
pub trait Algorithm: Send {
    /// Runs until the algorithm has nothing left to do
    fn optimize(&mut self) -> BPSolution;

    /// Performs at most `limit` steps (items placed or moves committed).
    /// Also returns whether the algorithm has finished.
    fn optimize_step(&mut self, limit: usize) -> (BPSolution, bool);

    fn debug_visualizer(&self) -> &dyn DebugVisualizer {
        &NoDebug
    }
}

impl<O, P> Algorithm for GreedyPacker<Rect, O, GenericBinPacker<P>>
where
    P: Placer + Send,
    P::Container: Send,
    O: OrderingStrategy<Rect, BPProblem<P::Container>> + Send,
{
    fn optimize(&mut self) -> BPSolution {
        let solution = GreedyPacker::optimize(self).save();
        log_summary("GREEDY", &solution);
        solution
    }

    fn optimize_step(&mut self, limit: usize) -> (BPSolution, bool) {
        let (problem, done) = GreedyPacker::optimize_step(self, limit);
        (problem.save(), done)
    }
}

impl<S, C> Algorithm for LocalSearch<S>
where
    S: LocalSearchStrategy<Solution = BPProblem<C>> + Send,
    C: Container + Send,
{
    fn optimize(&mut self) -> BPSolution {
        let solution = LocalSearch::optimize(self).save();
        log_summary("LS", &solution);
        solution
    }

    fn optimize_step(&mut self, limit: usize) -> (BPSolution, bool) {
        let (problem, converged) = LocalSearch::optimize_step(self, limit);
        (problem.save(), converged)
    }

    fn debug_visualizer(&self) -> &dyn DebugVisualizer {
        self.strategy().debug_visualizer()
    }
}

fn log_summary(tag: &str, solution: &BPSolution) {
    info!(
        "[{tag}] finished with {} containers (lower bound {}), k1 density {:.3}%",
        solution.n_containers(),
        solution.lower_bound,
        solution.k1_pack_density() * 100.0
    );
}

/// All available optimizer configurations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum AlgorithmKind {
    GreedyOnlineNormalPosFirstFit,
    GreedyOnlineNormalPosCircTouch,
    GreedyOnlineNormalPosCircTouchBestFit,
    GreedyOnlineSpaceFf,
    GreedyAreaDescNormalPosFirstFit,
    GreedyAreaDescNormalPosCircTouch,
    GreedyAreaDescNormalPosCircTouchBestFit,
    GreedyAreaDescSpaceFf,
    GreedyAdaptiveBfSpace,
    LocalSearchLocalSequence,
    LocalSearchRepackSpace,
    LocalSearchRelaxedSpace,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 12] = [
        AlgorithmKind::GreedyOnlineNormalPosFirstFit,
        AlgorithmKind::GreedyOnlineNormalPosCircTouch,
        AlgorithmKind::GreedyOnlineNormalPosCircTouchBestFit,
        AlgorithmKind::GreedyOnlineSpaceFf,
        AlgorithmKind::GreedyAreaDescNormalPosFirstFit,
        AlgorithmKind::GreedyAreaDescNormalPosCircTouch,
        AlgorithmKind::GreedyAreaDescNormalPosCircTouchBestFit,
        AlgorithmKind::GreedyAreaDescSpaceFf,
        AlgorithmKind::GreedyAdaptiveBfSpace,
        AlgorithmKind::LocalSearchLocalSequence,
        AlgorithmKind::LocalSearchRepackSpace,
        AlgorithmKind::LocalSearchRelaxedSpace,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmKind::GreedyOnlineNormalPosFirstFit => "Greedy-Online-NormalPosFirstFit",
            AlgorithmKind::GreedyOnlineNormalPosCircTouch => "Greedy-Online-NormalPosCircTouch",
            AlgorithmKind::GreedyOnlineNormalPosCircTouchBestFit => "Greedy-Online-NormalPosCircTouch-BestFit",
            AlgorithmKind::GreedyOnlineSpaceFf => "Greedy-Online-SpaceFF",
            AlgorithmKind::GreedyAreaDescNormalPosFirstFit => "Greedy-AreaDesc-NormalPosFirstFit",
            AlgorithmKind::GreedyAreaDescNormalPosCircTouch => "Greedy-AreaDesc-NormalPosCircTouch",
            AlgorithmKind::GreedyAreaDescNormalPosCircTouchBestFit => "Greedy-AreaDesc-NormalPosCircTouch-BestFit",
            AlgorithmKind::GreedyAreaDescSpaceFf => "Greedy-AreaDesc-SpaceFF",
            AlgorithmKind::GreedyAdaptiveBfSpace => "Greedy-AdaptiveBF-Space",
            AlgorithmKind::LocalSearchLocalSequence => "LocalSearch-LocalSequence",
            AlgorithmKind::LocalSearchRepackSpace => "LocalSearch-RepackSpace",
            AlgorithmKind::LocalSearchRelaxedSpace => "LocalSearch-RelaxedSpace",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            AlgorithmKind::GreedyOnlineNormalPosFirstFit => "Gr. Online NPFF",
            AlgorithmKind::GreedyOnlineNormalPosCircTouch => "Gr. Online CircTouch",
            AlgorithmKind::GreedyOnlineNormalPosCircTouchBestFit => "Gr. Online CircTouch BF",
            AlgorithmKind::GreedyOnlineSpaceFf => "Gr. Online SpaceFF",
            AlgorithmKind::GreedyAreaDescNormalPosFirstFit => "Gr. AreaDesc NPFF",
            AlgorithmKind::GreedyAreaDescNormalPosCircTouch => "Gr. AreaDesc CircTouch",
            AlgorithmKind::GreedyAreaDescNormalPosCircTouchBestFit => "Gr. AreaDesc CircTouch BF",
            AlgorithmKind::GreedyAreaDescSpaceFf => "Gr. AreaDesc SpaceFF",
            AlgorithmKind::GreedyAdaptiveBfSpace => "Gr. AdaptiveBF Space",
            AlgorithmKind::LocalSearchLocalSequence => "LS LocalSequence",
            AlgorithmKind::LocalSearchRepackSpace => "LS RepackSpace",
            AlgorithmKind::LocalSearchRelaxedSpace => "LS RelaxedSpace",
        }
    }

    pub fn is_local_search(&self) -> bool {
        matches!(
            self,
            AlgorithmKind::LocalSearchLocalSequence
                | AlgorithmKind::LocalSearchRepackSpace
                | AlgorithmKind::LocalSearchRelaxedSpace
        )
    }
}

impl Display for AlgorithmKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Sets up the algorithm of `kind` for `instance`
pub fn init(kind: AlgorithmKind, instance: &BPInstance, config: &BPConfig) -> Box<dyn Algorithm> {
    use AlgorithmKind::*;
    use ContainerSelection::FirstFit;

    let boxes = &instance.boxes;
    match kind {
        GreedyOnlineNormalPosFirstFit => greedy(OnlineOrdering::new(boxes), NormalPosFirstFit, FirstFit, instance),
        GreedyOnlineNormalPosCircTouch => greedy(OnlineOrdering::new(boxes), CircTouch, FirstFit, instance),
        GreedyOnlineNormalPosCircTouchBestFit => {
            let packer = GenericBinPacker::gold_standard(instance);
            Box::new(GreedyPacker::<Rect, _, _>::new(OnlineOrdering::new(boxes), packer))
        }
        GreedyOnlineSpaceFf => greedy(OnlineOrdering::new(boxes), SpaceFirstFit, FirstFit, instance),
        GreedyAreaDescNormalPosFirstFit => {
            greedy(AreaDescOrdering::new(boxes), NormalPosFirstFit, FirstFit, instance)
        }
        GreedyAreaDescNormalPosCircTouch => greedy(AreaDescOrdering::new(boxes), CircTouch, FirstFit, instance),
        GreedyAreaDescNormalPosCircTouchBestFit => {
            let packer = GenericBinPacker::gold_standard(instance);
            Box::new(GreedyPacker::<Rect, _, _>::new(AreaDescOrdering::new(boxes), packer))
        }
        GreedyAreaDescSpaceFf => greedy(AreaDescOrdering::new(boxes), SpaceFirstFit, FirstFit, instance),
        GreedyAdaptiveBfSpace => greedy(AdaptiveBestFitOrdering::new(boxes), SpaceFirstFit, FirstFit, instance),
        LocalSearchLocalSequence => local_search(LocalSequence::new(instance.clone()), config),
        LocalSearchRepackSpace => {
            let strategy = RepackSpace::new(instance.clone(), config, debug_visualizer(config));
            local_search(strategy, config)
        }
        LocalSearchRelaxedSpace => {
            let strategy = RelaxedSpace::new(instance.clone(), config, debug_visualizer(config));
            local_search(strategy, config)
        }
    }
}

fn greedy<O, P>(order: O, placer: P, selection: ContainerSelection, instance: &BPInstance) -> Box<dyn Algorithm>
where
    P: Placer + Send + 'static,
    P::Container: Send,
    O: OrderingStrategy<Rect, BPProblem<P::Container>> + Send + 'static,
{
    let packer = GenericBinPacker::new(placer, selection, instance, 0);
    Box::new(GreedyPacker::<Rect, _, _>::new(order, packer))
}

fn local_search<S, C>(strategy: S, config: &BPConfig) -> Box<dyn Algorithm>
where
    S: LocalSearchStrategy<Solution = BPProblem<C>> + Send + 'static,
    C: Container + Send + 'static,
{
    let rng = match config.prng_seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };
    Box::new(LocalSearch::new(strategy, config, rng))
}

fn debug_visualizer(config: &BPConfig) -> Box<dyn DebugVisualizer> {
    match config.svg_draw_options.debug_overlay {
        true => Box::new(SvgDebugVisualizer::default()),
        false => Box::new(NoDebug),
    }
}
