//! Bidirectional LSTM classifier on ndarray
//!
//! Input is a (T, 49) window of multi-hot draws. The forward cell reads it
//! oldest first, the backward cell newest first; their final hidden states are
//! concatenated into a dense layer with 49 independent sigmoid outputs.
//!
//! Gate layout inside the stacked weight matrices is `[i, f, g, o]`.

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, ArrayViewD, ArrayViewMutD, Axis};
use rand::Rng;

/// Clamp for log() in the loss
const PROB_EPS: f64 = 1e-7;

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Glorot uniform (fan_in, fan_out as Keras counts them)
fn glorot(rows: usize, cols: usize, fan_in: usize, fan_out: usize, rng: &mut impl Rng) -> Array2<f64> {
    let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
    Array2::from_shape_fn((rows, cols), |_| rng.gen_range(-limit..limit))
}

/// Outer product a ⊗ b
fn outer(a: &Array1<f64>, b: ArrayView1<f64>) -> Array2<f64> {
    a.view()
        .insert_axis(Axis(1))
        .dot(&b.insert_axis(Axis(0)))
}

/// Per-step values kept for backpropagation
#[derive(Debug, Clone)]
struct StepCache {
    x: Array1<f64>,
    h_prev: Array1<f64>,
    c_prev: Array1<f64>,
    i: Array1<f64>,
    f: Array1<f64>,
    g: Array1<f64>,
    o: Array1<f64>,
    c: Array1<f64>,
}

/// One LSTM direction. Also used as the gradient buffer of the same shape.
#[derive(Debug, Clone)]
pub struct LstmCell {
    /// (4H, D)
    pub w: Array2<f64>,
    /// (4H, H)
    pub u: Array2<f64>,
    /// (4H)
    pub b: Array1<f64>,
    hidden: usize,
}

impl LstmCell {
    pub fn new(input: usize, hidden: usize, rng: &mut impl Rng) -> Self {
        let mut b = Array1::<f64>::zeros(4 * hidden);
        // unit forget bias
        b.slice_mut(s![hidden..2 * hidden]).fill(1.0);
        Self {
            w: glorot(4 * hidden, input, input, 4 * hidden, rng),
            u: glorot(4 * hidden, hidden, hidden, 4 * hidden, rng),
            b,
            hidden,
        }
    }

    fn zeros_like(&self) -> Self {
        Self {
            w: Array2::zeros(self.w.raw_dim()),
            u: Array2::zeros(self.u.raw_dim()),
            b: Array1::zeros(self.b.raw_dim()),
            hidden: self.hidden,
        }
    }

    /// Run over `xs` row by row; returns the last hidden state
    fn forward(&self, xs: ArrayView2<f64>) -> (Array1<f64>, Vec<StepCache>) {
        let hd = self.hidden;
        let mut h = Array1::<f64>::zeros(hd);
        let mut c = Array1::<f64>::zeros(hd);
        let mut caches = Vec::with_capacity(xs.nrows());

        for x in xs.rows() {
            let z = self.w.dot(&x) + self.u.dot(&h) + &self.b;
            let i = z.slice(s![0..hd]).mapv(sigmoid);
            let f = z.slice(s![hd..2 * hd]).mapv(sigmoid);
            let g = z.slice(s![2 * hd..3 * hd]).mapv(f64::tanh);
            let o = z.slice(s![3 * hd..4 * hd]).mapv(sigmoid);

            let c_next = &f * &c + &i * &g;
            let h_next = &o * &c_next.mapv(f64::tanh);

            caches.push(StepCache {
                x: x.to_owned(),
                h_prev: h,
                c_prev: c,
                i,
                f,
                g,
                o,
                c: c_next.clone(),
            });
            h = h_next;
            c = c_next;
        }

        (h, caches)
    }

    /// Backpropagate `dh_last` (gradient on the final hidden state) through
    /// time, accumulating into `grads`
    fn backward(&self, caches: &[StepCache], dh_last: Array1<f64>, grads: &mut LstmCell) {
        let hd = self.hidden;
        let mut dh_next = dh_last;
        let mut dc_next = Array1::<f64>::zeros(hd);

        for step in caches.iter().rev() {
            let tanh_c = step.c.mapv(f64::tanh);
            let d_o = &dh_next * &tanh_c;
            let dc = &dc_next + &(&dh_next * &step.o * &tanh_c.mapv(|t| 1.0 - t * t));

            let d_i = &dc * &step.g;
            let d_g = &dc * &step.i;
            let d_f = &dc * &step.c_prev;
            dc_next = &dc * &step.f;

            let mut dz = Array1::<f64>::zeros(4 * hd);
            dz.slice_mut(s![0..hd])
                .assign(&(&d_i * &step.i.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![hd..2 * hd])
                .assign(&(&d_f * &step.f.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![2 * hd..3 * hd])
                .assign(&(&d_g * &step.g.mapv(|v| 1.0 - v * v)));
            dz.slice_mut(s![3 * hd..4 * hd])
                .assign(&(&d_o * &step.o.mapv(|v| v * (1.0 - v))));

            grads.w += &outer(&dz, step.x.view());
            grads.u += &outer(&dz, step.h_prev.view());
            grads.b += &dz;

            dh_next = self.u.t().dot(&dz);
        }
    }

    fn tensors(&self) -> Vec<ArrayViewD<'_, f64>> {
        vec![
            self.w.view().into_dyn(),
            self.u.view().into_dyn(),
            self.b.view().into_dyn(),
        ]
    }

    fn tensors_mut(&mut self) -> Vec<ArrayViewMutD<'_, f64>> {
        vec![
            self.w.view_mut().into_dyn(),
            self.u.view_mut().into_dyn(),
            self.b.view_mut().into_dyn(),
        ]
    }
}

/// Bidirectional LSTM with a sigmoid output per ball
#[derive(Debug, Clone)]
pub struct BiLstmClassifier {
    pub forward: LstmCell,
    pub backward: LstmCell,
    /// (outputs, 2H)
    pub w_out: Array2<f64>,
    /// (outputs)
    pub b_out: Array1<f64>,
    hidden: usize,
}

/// Gradient buffers share the model's layout
pub type BiLstmGradients = BiLstmClassifier;

/// Forward pass values needed for the backward pass
pub struct ForwardCache {
    fwd_steps: Vec<StepCache>,
    bwd_steps: Vec<StepCache>,
    features: Array1<f64>,
    pub probs: Array1<f64>,
}

impl BiLstmClassifier {
    pub fn new(input: usize, hidden: usize, outputs: usize, rng: &mut impl Rng) -> Self {
        Self {
            forward: LstmCell::new(input, hidden, rng),
            backward: LstmCell::new(input, hidden, rng),
            w_out: glorot(outputs, 2 * hidden, 2 * hidden, outputs, rng),
            b_out: Array1::zeros(outputs),
            hidden,
        }
    }

    pub fn hidden_units(&self) -> usize {
        self.hidden
    }

    pub fn zeros_like(&self) -> BiLstmGradients {
        Self {
            forward: self.forward.zeros_like(),
            backward: self.backward.zeros_like(),
            w_out: Array2::zeros(self.w_out.raw_dim()),
            b_out: Array1::zeros(self.b_out.raw_dim()),
            hidden: self.hidden,
        }
    }

    pub fn forward_cached(&self, window: ArrayView2<f64>) -> ForwardCache {
        let (h_fwd, fwd_steps) = self.forward.forward(window);
        let (h_bwd, bwd_steps) = self.backward.forward(window.slice(s![..;-1, ..]));

        let mut features = Array1::<f64>::zeros(2 * self.hidden);
        features.slice_mut(s![..self.hidden]).assign(&h_fwd);
        features.slice_mut(s![self.hidden..]).assign(&h_bwd);

        let probs = (self.w_out.dot(&features) + &self.b_out).mapv(sigmoid);
        ForwardCache {
            fwd_steps,
            bwd_steps,
            features,
            probs,
        }
    }

    /// Output probabilities for one window
    pub fn predict(&self, window: ArrayView2<f64>) -> Array1<f64> {
        self.forward_cached(window).probs
    }

    /// Mean binary cross-entropy of `probs` against `target`
    pub fn loss(probs: &Array1<f64>, target: &Array1<f64>) -> f64 {
        let n = probs.len().max(1) as f64;
        probs
            .iter()
            .zip(target.iter())
            .map(|(&p, &y)| {
                let p = p.clamp(PROB_EPS, 1.0 - PROB_EPS);
                -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
            })
            .sum::<f64>()
            / n
    }

    /// Forward + backward for one sample. Gradients are scaled by `scale`
    /// (1 / batch size) and added to `grads`. Returns the sample loss.
    pub fn accumulate_gradients(
        &self,
        window: ArrayView2<f64>,
        target: &Array1<f64>,
        scale: f64,
        grads: &mut BiLstmGradients,
    ) -> f64 {
        let cache = self.forward_cached(window);
        let loss = Self::loss(&cache.probs, target);

        // d(mean BCE)/d(logit) for a sigmoid output
        let outputs = cache.probs.len() as f64;
        let d_logit = (&cache.probs - target) * (scale / outputs);

        grads.w_out += &outer(&d_logit, cache.features.view());
        grads.b_out += &d_logit;

        let d_features = self.w_out.t().dot(&d_logit);
        let dh_fwd = d_features.slice(s![..self.hidden]).to_owned();
        let dh_bwd = d_features.slice(s![self.hidden..]).to_owned();

        self.forward
            .backward(&cache.fwd_steps, dh_fwd, &mut grads.forward);
        self.backward
            .backward(&cache.bwd_steps, dh_bwd, &mut grads.backward);

        loss
    }

    /// Every trainable tensor, in a fixed order
    pub fn tensors(&self) -> Vec<ArrayViewD<'_, f64>> {
        let mut out = self.forward.tensors();
        out.extend(self.backward.tensors());
        out.push(self.w_out.view().into_dyn());
        out.push(self.b_out.view().into_dyn());
        out
    }

    /// Mutable views in the same order as `tensors`
    pub fn tensors_mut(&mut self) -> Vec<ArrayViewMutD<'_, f64>> {
        let mut out = self.forward.tensors_mut();
        out.extend(self.backward.tensors_mut());
        out.push(self.w_out.view_mut().into_dyn());
        out.push(self.b_out.view_mut().into_dyn());
        out
    }

    pub fn parameter_count(&self) -> usize {
        self.tensors().iter().map(|t| t.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn window(rng: &mut StdRng, t: usize, d: usize) -> Array2<f64> {
        Array2::from_shape_fn((t, d), |_| if rng.gen_bool(0.2) { 1.0 } else { 0.0 })
    }

    #[test]
    fn test_forget_bias_and_shapes() {
        let mut rng = StdRng::seed_from_u64(7);
        let model = BiLstmClassifier::new(49, 4, 49, &mut rng);

        assert_eq!(model.forward.w.dim(), (16, 49));
        assert_eq!(model.forward.u.dim(), (16, 4));
        assert_eq!(model.w_out.dim(), (49, 8));
        assert!(model.forward.b.slice(s![4..8]).iter().all(|&b| b == 1.0));
        assert!(model.forward.b.slice(s![0..4]).iter().all(|&b| b == 0.0));

        let params = 2 * (16 * 49 + 16 * 4 + 16) + 49 * 8 + 49;
        assert_eq!(model.parameter_count(), params);
    }

    #[test]
    fn test_predict_outputs_probabilities() {
        let mut rng = StdRng::seed_from_u64(11);
        let model = BiLstmClassifier::new(49, 6, 49, &mut rng);
        let x = window(&mut rng, 10, 49);

        let probs = model.predict(x.view());
        assert_eq!(probs.len(), 49);
        assert!(probs.iter().all(|&p| p > 0.0 && p < 1.0));
    }

    #[test]
    fn test_loss_is_small_for_matching_probs() {
        let target = Array1::from(vec![1.0, 0.0, 1.0]);
        let good = Array1::from(vec![0.99, 0.01, 0.99]);
        let bad = Array1::from(vec![0.01, 0.99, 0.01]);
        assert!(BiLstmClassifier::loss(&good, &target) < 0.02);
        assert!(BiLstmClassifier::loss(&bad, &target) > 4.0);
    }

    #[test]
    fn test_gradients_match_finite_differences() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut model = BiLstmClassifier::new(5, 3, 4, &mut rng);
        let x = window(&mut rng, 4, 5);
        let target = Array1::from(vec![1.0, 0.0, 0.0, 1.0]);

        let mut grads = model.zeros_like();
        model.accumulate_gradients(x.view(), &target, 1.0, &mut grads);
        let analytic: Vec<Vec<f64>> = grads
            .tensors()
            .iter()
            .map(|t| t.iter().copied().collect())
            .collect();

        let eps = 1e-6;
        let tensor_count = model.tensors().len();
        for tensor in 0..tensor_count {
            // check a few entries of every tensor
            for idx in [0usize, 1] {
                let original = model.tensors_mut()[tensor].as_slice_mut().unwrap()[idx];

                model.tensors_mut()[tensor].as_slice_mut().unwrap()[idx] = original + eps;
                let plus = BiLstmClassifier::loss(&model.predict(x.view()), &target);
                model.tensors_mut()[tensor].as_slice_mut().unwrap()[idx] = original - eps;
                let minus = BiLstmClassifier::loss(&model.predict(x.view()), &target);
                model.tensors_mut()[tensor].as_slice_mut().unwrap()[idx] = original;

                let numeric = (plus - minus) / (2.0 * eps);
                let diff = (numeric - analytic[tensor][idx]).abs();
                assert!(
                    diff < 1e-5,
                    "tensor {} idx {}: numeric {} analytic {}",
                    tensor,
                    idx,
                    numeric,
                    analytic[tensor][idx]
                );
            }
        }
    }
}
