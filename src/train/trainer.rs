use crate::{
    error::{NnError, Result},
    loss::mse::MseLoss,
    network::architecture::Architecture,
};

/// One supervised epoch of per-sample backpropagation against MSE.
///
/// `weights` holds one importance factor per sample (e.g. the flavor
/// reweighting factor of each event). Returns the mean unweighted loss.
pub fn train_network(
    network: &mut Architecture,
    inputs: &[Vec<f64>],
    expected_outputs: &[Vec<f64>],
    weights: &[f64],
) -> Result<f64> {
    if inputs.is_empty() {
        return Err(NnError::EmptyInput("training inputs"));
    }
    if inputs.len() != expected_outputs.len() {
        return Err(NnError::LengthMismatch {
            context: "training inputs and targets",
            left: inputs.len(),
            right: expected_outputs.len(),
        });
    }
    if inputs.len() != weights.len() {
        return Err(NnError::LengthMismatch {
            context: "training inputs and weights",
            left: inputs.len(),
            right: weights.len(),
        });
    }

    let mut total_loss = 0.0;

    for ((input, expected), &weight) in inputs.iter().zip(expected_outputs).zip(weights) {
        let output = network.forward(input)?;
        if output.len() != expected.len() {
            return Err(NnError::DimensionMismatch {
                context: "training target",
                expected: output.len(),
                actual: expected.len(),
            });
        }

        total_loss += MseLoss::loss(&output, expected);

        // ∂L/∂a at the output layer
        let error = MseLoss::derivative(&output, expected);
        network.propagate_error(&error, weight)?;
    }

    Ok(total_loss / inputs.len() as f64)
}
