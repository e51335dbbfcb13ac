use crate::engine::RunSummary;
use crate::model::StoredGame;
use crate::report::standings::{FailedWord, ModelStanding};
use crate::storage::store::GamePage;

pub fn print_summary(summary: &RunSummary) {
    for f in &summary.failures {
        let label = match f.kind {
            "persist" => "PERSIST",
            _ => "FAULT",
        };
        eprintln!("{} [{} {}]: {}", label, f.model, f.word, f.message);
    }

    eprintln!(
        "Results: scheduled={} skipped={} solved={} exhausted={} errored={} faulted={} persist_failed={} cost=${:.4}",
        summary.scheduled,
        summary.skipped,
        summary.solved,
        summary.exhausted,
        summary.errored,
        summary.faulted,
        summary.persist_failed,
        summary.total_cost
    );
}

pub fn print_standings(standings: &[ModelStanding], failed: &[FailedWord]) {
    eprintln!(
        "{:>4}  {:<40} {:>6} {:>8} {:>8} {:>10}",
        "rank", "model", "games", "success", "guesses", "cost/game"
    );
    for (i, s) in standings.iter().enumerate() {
        let guesses = s
            .guesses_per_game_avg
            .map(|g| format!("{g:.2}"))
            .unwrap_or_else(|| "-".into());
        eprintln!(
            "{:>4}  {:<40} {:>6} {:>7.1}% {:>8} {:>10.4}",
            i + 1,
            s.model,
            s.games,
            s.success_rate,
            guesses,
            s.avg_cost_per_game
        );
    }

    if !failed.is_empty() {
        eprintln!();
        eprintln!("Hardest words:");
        for (i, w) in failed.iter().enumerate() {
            eprintln!("{:>4}  {} ({} failed)", i + 1, w.word, w.failures);
        }
    }
}

pub fn print_page(page: &GamePage) {
    println!(
        "{:>6}  {:<40} {:<8} {:>7} {:>6} {:>5} {:>10}",
        "id", "model", "word", "guesses", "solved", "error", "cost"
    );
    for g in &page.games {
        println!(
            "{:>6}  {:<40} {:<8} {:>7} {:>6} {:>5} {:>10.4}",
            g.id, g.game.model, g.game.word, g.game.guesses, g.game.solved, g.game.error, g.game.cost
        );
    }
    eprintln!(
        "page {}/{} ({} games)",
        page.page,
        page.total_pages().max(1),
        page.total
    );
}

pub fn print_game(g: &StoredGame) {
    println!(
        "#{} {} {} outcome={} guesses={} cost={:.4}",
        g.id,
        g.game.model,
        g.game.word,
        g.game.outcome().as_str(),
        g.game.guesses,
        g.game.cost
    );
    for m in &g.game.messages {
        println!("--- {}", m.role.as_str());
        println!("{}", m.content);
    }
}
