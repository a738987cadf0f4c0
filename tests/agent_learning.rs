//! Learning behaviour of the TD agents on small hand-built problems

use pong_rl::{
    Action, DiscreteState, Hyperparameters, QLearningAgent, SarsaAgent, ports::Agent,
};

fn bandit_state() -> DiscreteState {
    DiscreteState::new([6, 6, 0, 0, 4, 4])
}

fn sink_state() -> DiscreteState {
    DiscreteState::new([0, 0, -1, -1, 0, 0])
}

/// One decision; only moving up pays.
fn play_bandit<A: Agent>(agent: &mut A, rounds: usize) {
    let (state, sink) = (bandit_state(), sink_state());
    for _ in 0..rounds {
        let action = agent.choose_action(&state);
        let reward = if action == Action::MoveUp { 1.0 } else { 0.0 };
        agent.observe(&state, action, reward, &sink);
    }
}

#[test]
fn q_learning_finds_paying_action() {
    let mut agent = QLearningAgent::new(Hyperparameters::q_learning())
        .unwrap()
        .with_seed(42);
    play_bandit(&mut agent, 600);

    assert_eq!(agent.best_action(&bandit_state()), Action::MoveUp);
    let values = agent.q_table().action_values(&bandit_state());
    assert!(values[1] > 0.5 && values[1] <= 1.0);
    assert_eq!(values[0], 0.0);
    assert_eq!(values[2], 0.0);
}

#[test]
fn sarsa_finds_paying_action() {
    let mut agent = SarsaAgent::new(Hyperparameters::sarsa())
        .unwrap()
        .with_seed(42);
    play_bandit(&mut agent, 600);

    assert_eq!(agent.best_action(&bandit_state()), Action::MoveUp);
    // The sink state is never updated, so the bootstrap term stays zero.
    assert_eq!(agent.q_table().max_q(&sink_state()), 0.0);
}

#[test]
fn learning_rate_never_drops_below_floor() {
    let params = Hyperparameters {
        alpha_decay: 0.5,
        ..Hyperparameters::q_learning()
    };
    let mut agent = QLearningAgent::new(params).unwrap().with_seed(1);
    play_bandit(&mut agent, 100);
    assert_eq!(agent.schedule().alpha(), params.alpha_end);
}

#[test]
fn exploration_follows_exponential_schedule() {
    let params = Hyperparameters {
        epsilon_decay: 50.0,
        ..Hyperparameters::q_learning()
    };
    let mut agent = QLearningAgent::new(params).unwrap().with_seed(3);
    for _ in 0..100 {
        agent.choose_action(&bandit_state());
    }
    let expected = params.epsilon_end
        + (params.epsilon_start - params.epsilon_end) * (-100.0f64 / 50.0).exp();
    assert!((agent.epsilon() - expected).abs() < 1e-12);
    assert_eq!(agent.schedule().steps_done(), 100);
}

#[test]
fn sarsa_observe_advances_exploration() {
    let mut sarsa = SarsaAgent::new(Hyperparameters::sarsa()).unwrap().with_seed(5);
    let mut q = QLearningAgent::new(Hyperparameters::q_learning())
        .unwrap()
        .with_seed(5);

    sarsa.observe(&bandit_state(), Action::Stay, 0.0, &sink_state());
    q.observe(&bandit_state(), Action::Stay, 0.0, &sink_state());

    assert_eq!(sarsa.schedule().steps_done(), 1);
    assert_eq!(q.schedule().steps_done(), 0);
}

#[test]
fn greedy_selection_is_read_only() {
    let mut agent = QLearningAgent::new(Hyperparameters::q_learning())
        .unwrap()
        .with_seed(9);
    play_bandit(&mut agent, 50);
    let before = agent.q_table().clone();
    let steps = agent.schedule().steps_done();

    for _ in 0..20 {
        agent.choose_best_action(&bandit_state());
    }

    assert_eq!(agent.q_table(), &before);
    assert_eq!(agent.schedule().steps_done(), steps);
}
