use super::{build_query, exit_codes, open_existing};
use crate::cli::args::{GamesArgs, GamesSub};
use wordlebench_core::report::console;

pub fn cmd_games(args: GamesArgs) -> anyhow::Result<i32> {
    let store = open_existing(&args.source)?;
    let handle = store.handle()?;

    let code = match args.cmd {
        GamesSub::List(list) => {
            let page = handle.list(&build_query(&list)?)?;
            console::print_page(&page);
            if page.page == 1 {
                let opts = handle.filter_options()?;
                eprintln!(
                    "models: {} | words: {}",
                    opts.models.join(", "),
                    opts.words.len()
                );
            }
            exit_codes::OK
        }
        GamesSub::Show { id } => match handle.get(id)? {
            Some(game) => {
                console::print_game(&game);
                exit_codes::OK
            }
            None => {
                eprintln!("no game with id {id}");
                exit_codes::RUN_FAILED
            }
        },
    };
    handle.quiesce()?;
    Ok(code)
}
