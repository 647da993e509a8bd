//! Adam optimizer state for the dense layer

use ndarray::Array1;

pub const DEFAULT_BETA1: f32 = 0.9;
pub const DEFAULT_BETA2: f32 = 0.999;
pub const DEFAULT_EPSILON: f32 = 1e-7;

/// First/second moment estimates for kernel and bias.
/// Lives with the in-memory model so warm starts keep their momentum;
/// it is not persisted.
#[derive(Debug, Clone)]
pub struct Adam {
    pub learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    m_w: Array1<f32>,
    v_w: Array1<f32>,
    m_b: f32,
    v_b: f32,
    step: i32,
}

impl Adam {
    pub fn new(dim: usize, learning_rate: f32) -> Self {
        Self {
            learning_rate,
            beta1: DEFAULT_BETA1,
            beta2: DEFAULT_BETA2,
            epsilon: DEFAULT_EPSILON,
            m_w: Array1::zeros(dim),
            v_w: Array1::zeros(dim),
            m_b: 0.0,
            v_b: 0.0,
            step: 0,
        }
    }

    pub fn steps(&self) -> i32 {
        self.step
    }

    /// Apply one update in place
    pub fn apply(&mut self, weights: &mut Array1<f32>, bias: &mut f32, grad_w: &Array1<f32>, grad_b: f32) {
        self.step += 1;
        let (b1, b2) = (self.beta1, self.beta2);
        let correction1 = 1.0 - b1.powi(self.step);
        let correction2 = 1.0 - b2.powi(self.step);

        self.m_w = &self.m_w * b1 + grad_w * (1.0 - b1);
        self.v_w = &self.v_w * b2 + &grad_w.mapv(|g| g * g) * (1.0 - b2);

        let lr = self.learning_rate;
        let eps = self.epsilon;
        ndarray::Zip::from(weights)
            .and(&self.m_w)
            .and(&self.v_w)
            .for_each(|w, &m, &v| {
                let m_hat = m / correction1;
                let v_hat = v / correction2;
                *w -= lr * m_hat / (v_hat.sqrt() + eps);
            });

        self.m_b = b1 * self.m_b + (1.0 - b1) * grad_b;
        self.v_b = b2 * self.v_b + (1.0 - b2) * grad_b * grad_b;
        let m_hat = self.m_b / correction1;
        let v_hat = self.v_b / correction2;
        *bias -= lr * m_hat / (v_hat.sqrt() + eps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_step_moves_by_learning_rate() {
        // With bias correction the first Adam step is ~lr * sign(grad)
        let mut adam = Adam::new(2, 0.05);
        let mut w = Array1::from_vec(vec![0.0f32, 0.0]);
        let mut b = 0.0f32;
        adam.apply(&mut w, &mut b, &Array1::from_vec(vec![2.0, -0.5]), 1.0);

        assert!((w[0] + 0.05).abs() < 1e-4);
        assert!((w[1] - 0.05).abs() < 1e-4);
        assert!((b + 0.05).abs() < 1e-4);
        assert_eq!(adam.steps(), 1);
    }
}
