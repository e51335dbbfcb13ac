use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;
use wordlebench_core::model::{Game, Message};
use wordlebench_core::storage::{GameQuery, Store};

fn game(model: &str, word: &str, turns: usize) -> Game {
    let mut messages = vec![Message::system("sys"), Message::user("go")];
    for t in 0..turns {
        messages.push(Message::assistant(format!("<guess>{word}</guess> {}", "x".repeat(2048))));
        messages.push(Message::user(format!("Result: BBBB{t}")));
    }
    Game {
        model: model.into(),
        word: word.into(),
        guesses: turns as i64,
        solved: false,
        error: false,
        messages,
        cost: 0.001 * turns as f64,
    }
}

#[test]
fn test_concurrent_inserts_lose_nothing() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = Store::open(&dir.path().join("games.db"))?;

    let threads = 8;
    let per_thread = 40;
    let mut joins = Vec::new();
    for t in 0..threads {
        let store = store.clone();
        joins.push(thread::spawn(move || -> anyhow::Result<()> {
            let mut h = store.handle()?;
            for i in 0..per_thread {
                h.insert(&game(&format!("model-{t}"), &format!("W{i:04}"), 3))?;
            }
            h.quiesce()
        }));
    }
    for j in joins {
        j.join().expect("writer thread panicked")?;
    }

    let h = store.handle()?;
    assert_eq!(h.count()?, (threads * per_thread) as u64);
    for t in 0..threads {
        for i in 0..per_thread {
            assert!(h.exists(&format!("model-{t}"), &format!("W{i:04}"))?);
        }
    }
    Ok(())
}

#[test]
fn test_reads_during_inserts_see_whole_rows() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let store = Store::open(&dir.path().join("games.db"))?;
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let store = store.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || -> anyhow::Result<()> {
            let mut h = store.handle()?;
            for i in 0..150 {
                h.insert(&game("writer", &format!("W{i:04}"), 1 + i % 5))?;
            }
            done.store(true, Ordering::SeqCst);
            Ok(())
        })
    };

    let reader = {
        let store = store.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || -> anyhow::Result<usize> {
            let h = store.handle()?;
            let mut checks = 0;
            loop {
                let finished = done.load(Ordering::SeqCst);
                let page = h.list(&GameQuery {
                    per_page: 1000,
                    ..GameQuery::default()
                })?;
                assert_eq!(page.total as usize, page.games.len());
                for g in &page.games {
                    let turns = g.game.guesses as usize;
                    assert_eq!(g.game.messages.len(), 2 + 2 * turns);
                    assert!((g.game.cost - 0.001 * turns as f64).abs() < 1e-12);
                }
                checks += 1;
                if finished {
                    return Ok(checks);
                }
            }
        })
    };

    writer.join().expect("writer panicked")?;
    let checks = reader.join().expect("reader panicked")?;
    assert!(checks >= 1);
    assert_eq!(store.handle()?.count()?, 150);
    Ok(())
}
