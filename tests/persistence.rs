//! Saving and loading trained agents

use std::fs;

use pong_rl::{
    Error, PhysicsConfig, RewardConfig, SinglePaddleEnv,
    adapters::MsgPackRepository,
    app::App,
    pipeline::{TrainingConfig, TrainingPipeline},
    ports::{Agent, AgentRepository},
    q_learning::{Hyperparameters, SavedTdAgent, TdAgent, TdAlgorithm, TrainingMetadata},
};

fn trained(algorithm: TdAlgorithm) -> TdAgent {
    let app = App::new();
    let params = match algorithm {
        TdAlgorithm::QLearning => Hyperparameters::q_learning(),
        TdAlgorithm::Sarsa => Hyperparameters::sarsa(),
    };
    let mut agent = app.create_agent(algorithm, params).unwrap();
    let mut env =
        SinglePaddleEnv::new(PhysicsConfig::default(), RewardConfig::default(), Some(17)).unwrap();
    let mut pipeline = TrainingPipeline::new(TrainingConfig {
        episodes: 20,
        max_steps_per_episode: Some(300),
        seed: Some(17),
        log_interval: 10,
    });
    pipeline.train_single(&mut env, &mut agent).unwrap();
    agent
}

#[test]
fn saved_agent_acts_like_the_original() {
    for algorithm in [TdAlgorithm::QLearning, TdAlgorithm::Sarsa] {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.msgpack");
        let agent = trained(algorithm);
        let app = App::new();

        app.save_agent(&agent, TrainingMetadata::default(), &path)
            .unwrap();
        let loaded = app.load_agent(&path).unwrap();

        assert_eq!(loaded.name(), agent.name());
        assert_eq!(loaded.q_table(), agent.q_table());
        assert_eq!(
            loaded.schedule().steps_done(),
            agent.schedule().steps_done()
        );
        assert_eq!(loaded.schedule().alpha(), agent.schedule().alpha());
        for entry in agent.q_table().entries() {
            assert_eq!(
                loaded.best_action(&entry.state),
                agent.best_action(&entry.state)
            );
        }
    }
}

#[test]
fn metadata_survives_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agent.msgpack");
    let agent = trained(TdAlgorithm::QLearning);
    let metadata = TrainingMetadata {
        episodes_trained: Some(20),
        mode: Some("single".to_string()),
        side: Some("left".to_string()),
        opponent: None,
        seed: Some(17),
        saved_at: Some(1_700_000_000),
    };

    let repo = MsgPackRepository::new();
    repo.save(&SavedTdAgent::from_agent(&agent, metadata.clone()), &path)
        .unwrap();
    let saved = repo.load(&path).unwrap();

    assert_eq!(saved.metadata, metadata);
    assert_eq!(saved.algorithm, TdAlgorithm::QLearning);
    assert_eq!(saved.version, SavedTdAgent::VERSION);
    assert_eq!(saved.total_visits(), agent.q_table().total_visits());
}

#[test]
fn corrupt_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.msgpack");
    fs::write(&path, b"definitely not messagepack").unwrap();

    let err = MsgPackRepository::new().load(&path).unwrap_err();
    assert!(matches!(err, Error::Load { .. }), "unexpected error: {err}");
}

#[test]
fn missing_file_is_a_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = MsgPackRepository::new()
        .load(&dir.path().join("absent.msgpack"))
        .unwrap_err();
    assert!(matches!(err, Error::Load { .. }));
}

#[test]
fn other_format_version_is_rejected() {
    let agent = trained(TdAlgorithm::Sarsa);
    let mut saved = SavedTdAgent::from_agent(&agent, TrainingMetadata::default());
    saved.version = SavedTdAgent::VERSION + 1;
    let bytes = saved.to_bytes().unwrap();

    let err = SavedTdAgent::from_bytes(&bytes, "future.msgpack").unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedFormatVersion { found, expected }
            if found == SavedTdAgent::VERSION + 1 && expected == SavedTdAgent::VERSION
    ));
}
