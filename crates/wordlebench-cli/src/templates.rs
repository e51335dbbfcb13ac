pub const SYSTEM_PROMPT: &str = r#"You are playing Wordle. The hidden answer is a five-letter English word.

After each guess you receive a line of the form `Result: XXXXX`, one letter per position:
- G: the letter is in the answer at this position
- Y: the letter is in the answer at another position
- B: the letter is not in the answer

You have five guesses. Think as much as you like, but always end your reply with exactly one
guess wrapped in tags, for example <guess>CRANE</guess>.
"#;

pub const USER_PROMPT: &str = "Let's start. Make your first guess inside <guess></guess> tags.\n";

pub const WORDS: &str = "CRANE\nPIZZA\nEERIE\nGHOST\nMOIST\n";

pub const GITIGNORE: &str = "/games.db\n*.db-shm\n*.db-wal\n/results.json\n";
