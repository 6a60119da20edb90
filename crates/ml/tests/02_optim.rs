use ml::{Adam, Sgd, Tensor};

// Minimize f(p) = sum(p_i^2) by feeding the optimizers its gradient 2p.
fn quadratic_grad(p: &Tensor) -> Tensor {
    Tensor::from_vec(p.shape.clone(), p.data.iter().map(|v| 2.0 * v).collect())
}

fn norm(p: &Tensor) -> f32 {
    p.data.iter().map(|v| v * v).sum::<f32>().sqrt()
}

#[test]
fn sgd_descends_a_quadratic() {
    let mut p = Tensor::from_vec(vec![3], vec![1.0, -2.0, 0.5]);
    let opt = Sgd::new(0.1);
    let start = norm(&p);
    for _ in 0..50 {
        let g = quadratic_grad(&p);
        opt.step(&mut [&mut p], &[g]);
    }
    assert!(norm(&p) < start * 1e-3, "sgd should collapse toward zero");
}

#[test]
fn adam_descends_a_quadratic() {
    let mut p = Tensor::from_vec(vec![3], vec![1.0, -2.0, 0.5]);
    let mut opt = Adam::new(0.05);
    let start = norm(&p);
    for _ in 0..400 {
        let g = quadratic_grad(&p);
        opt.step(&mut [&mut p], &[g]);
    }
    assert!(norm(&p) < start * 0.05, "adam should collapse toward zero");
}

#[test]
fn adam_reset_clears_momentum() {
    let mut p = Tensor::from_vec(vec![1], vec![1.0]);
    let mut opt = Adam::new(0.1);
    for _ in 0..10 {
        let g = quadratic_grad(&p);
        opt.step(&mut [&mut p], &[g]);
    }
    opt.reset();
    // After a reset the first step behaves like a fresh optimizer: the
    // bias-corrected first step moves by exactly lr in the gradient
    // direction regardless of gradient magnitude.
    p.data[0] = 0.5;
    let before = p.data[0];
    let g = quadratic_grad(&p);
    opt.step(&mut [&mut p], &[g]);
    let moved = (before - p.data[0]).abs();
    assert!((moved - 0.1).abs() < 1e-4, "first adam step moves by lr, moved {moved}");
}
