//! Optimum-path forest classifier.
//!
//! Training builds a dense minimum spanning tree over the complete distance
//! graph, seeds prototypes on its class boundaries and grows a max-path
//! forest from them. Classification assigns each test vector the label of
//! the training node reachable at the lowest bottleneck cost.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod classifier;
mod distance;
mod error;
mod forest;
mod labels;
mod matrix;
mod model;
mod mst;
mod prototype;
#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::{
    builder::OpfBuilder,
    classifier::{OpfClassifier, Prediction},
    distance::{
        BuiltinMetric, Distance, DistanceError, DistanceErrorCode, DistanceMatrix, DistanceMetric,
        FnMetric, MetricAttempt, MetricChain, MetricChainError, MetricChainErrorCode,
        MetricOutcome, MetricRegistry, VectorKind, braycurtis_distance, canberra_distance,
        chebyshev_distance, cityblock_distance, cosine_distance, euclidean_distance,
        squared_euclidean_distance,
    },
    error::{DataError, DataErrorCode, ErrorKind, MatrixRole, OpfError, OpfErrorCode, Result},
    forest::{ForestError, ForestErrorCode, PathForest, grow_forest},
    labels::{DEFAULT_SENTINEL_MARGIN, LabelUniverse},
    matrix::FeatureMatrix,
    model::{MetricSelection, ModelError, ModelErrorCode, ModelParts, TrainedModel},
    mst::{MinimumSpanningTree, MstEdge, MstError, MstErrorCode, prim_mst},
    prototype::{PrototypeError, PrototypeErrorCode, select_prototypes},
};
