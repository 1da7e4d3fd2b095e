//! Stable error codes and kinds exposed by the public API.

use opforest_core::{
    DataError, DataErrorCode, DistanceError, ErrorKind, ForestError, MatrixRole, MetricAttempt,
    MetricChainError, ModelError, MstError, OpfError, OpfErrorCode,
};
use rstest::rstest;

fn exhausted() -> MetricChainError {
    MetricChainError::Exhausted {
        attempts: vec![MetricAttempt {
            metric: "euclidean".to_owned(),
            error: DistanceError::ZeroLength,
        }],
    }
}

#[rstest]
#[case(OpfError::InvalidSentinelMargin { got: 0 }, OpfErrorCode::InvalidSentinelMargin, ErrorKind::Precondition)]
#[case(OpfError::EmptyMetricName { tier: "primary" }, OpfErrorCode::EmptyMetricName, ErrorKind::Precondition)]
#[case(OpfError::EmptyTrainingSet, OpfErrorCode::EmptyTrainingSet, ErrorKind::Precondition)]
#[case(
    OpfError::LabelCountMismatch { samples: 2, labels: 1 },
    OpfErrorCode::LabelCountMismatch,
    ErrorKind::Precondition,
)]
#[case(
    OpfError::DimensionMismatch { expected: 2, actual: 3 },
    OpfErrorCode::DimensionMismatch,
    ErrorKind::Precondition,
)]
#[case(OpfError::AlreadyTrained, OpfErrorCode::AlreadyTrained, ErrorKind::Precondition)]
#[case(OpfError::NotTrained, OpfErrorCode::NotTrained, ErrorKind::Precondition)]
#[case(
    OpfError::SentinelOverflow { min_label: i64::MIN, margin: 1 },
    OpfErrorCode::SentinelOverflow,
    ErrorKind::Precondition,
)]
#[case(OpfError::LabelCollision { sentinel: -1 }, OpfErrorCode::LabelCollision, ErrorKind::Fatal)]
#[case(OpfError::Metric(exhausted()), OpfErrorCode::MetricFailure, ErrorKind::Metric)]
#[case(
    OpfError::Mst(MstError::NotSquare { rows: 1, cols: 2 }),
    OpfErrorCode::MstFailure,
    ErrorKind::Fatal,
)]
#[case(
    OpfError::Forest(ForestError::NoPrototypes { nodes: 3 }),
    OpfErrorCode::ForestFailure,
    ErrorKind::Fatal,
)]
#[case(
    OpfError::InvalidModel(ModelError::NoPrototypes),
    OpfErrorCode::InvalidModel,
    ErrorKind::Fatal,
)]
fn returns_expected_opf_code(
    #[case] error: OpfError,
    #[case] expected: OpfErrorCode,
    #[case] kind: ErrorKind,
) {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), expected.as_str());
    assert_eq!(error.kind(), kind);
    assert_eq!(error.data_code(), None);
}

#[rstest]
#[case(DataError::EmptyData, DataErrorCode::EmptyData)]
#[case(DataError::ZeroDimension, DataErrorCode::ZeroDimension)]
#[case(DataError::RaggedRow { row: 1, expected: 2, actual: 3 }, DataErrorCode::RaggedRow)]
fn feature_errors_expose_their_data_code(#[case] error: DataError, #[case] expected: DataErrorCode) {
    let wrapped = OpfError::InvalidFeatures {
        role: MatrixRole::Test,
        error,
    };
    assert_eq!(wrapped.code(), OpfErrorCode::InvalidFeatures);
    assert_eq!(wrapped.data_code(), Some(expected));
}

#[test]
fn exhausted_chain_lists_every_attempt() {
    let message = exhausted().to_string();
    assert!(message.contains("euclidean"), "{message}");
    assert_eq!(exhausted().code().as_str(), "METRIC_CHAIN_EXHAUSTED");
}

#[test]
fn codes_render_as_their_stable_string() {
    assert_eq!(OpfErrorCode::NotTrained.to_string(), "OPF_NOT_TRAINED");
    assert_eq!(DataErrorCode::NonFinite.as_str(), "DATA_NON_FINITE");
}
