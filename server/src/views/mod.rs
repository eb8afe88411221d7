//! Server-rendered HTML. Every fragment swaps itself in place through htmx,
//! so each cell carries its own id and request values.

use minesweeper_core::{Cell, CellState, Game, GameParams, GameStatus};

const STYLE: &str = "\
body { font-family: sans-serif; margin: 2rem; }
#grid { display: inline-block; user-select: none; }
.row { display: flex; }
.cell { width: 2rem; height: 2rem; border: 1px solid #999; display: flex; \
align-items: center; justify-content: center; font-weight: bold; }
.cell button { width: 100%; height: 100%; border: none; background: #ccc; cursor: pointer; }
.revealed { background: #eee; }
.flagged { background: #fc6; }
.mine { background: #e44; }
.status { margin: 1rem 0; }";

fn cell_id(x: usize, y: usize) -> String {
    format!("cell-{x}-{y}")
}

fn cell_class(cell: &Cell) -> String {
    match cell.state() {
        CellState::Hidden => "cell hidden".to_string(),
        CellState::Flagged => "cell flagged".to_string(),
        CellState::Mine => "cell mine".to_string(),
        CellState::Revealed { adjacent } => format!("cell revealed n{adjacent}"),
    }
}

/// A single cell. Left click reveals, right click toggles the flag. Once the
/// game is over the cell is inert.
pub fn cell(game: &Game, x: usize, y: usize) -> String {
    let Some(cell) = game.field().cell(x, y) else {
        return String::new();
    };

    let id = cell_id(x, y);
    let class = cell_class(cell);
    let glyph = match cell.state() {
        CellState::Hidden => ' ',
        _ => cell.glyph(),
    };

    if game.status().is_over() {
        return format!(r#"<div id="{id}" class="{class}">{glyph}</div>"#);
    }

    let context_action = if cell.is_flagged() { "/unflag" } else { "/flag" };
    let vals = format!(r#"{{"x": {x}, "y": {y}}}"#);
    let target = format!(r##"hx-target="#{id}" hx-swap="outerHTML""##);

    let inner = match cell.state() {
        CellState::Hidden => format!(
            r#"<button hx-post="/reveal" hx-trigger="click" {target}>{glyph}</button>"#
        ),
        _ => glyph.to_string(),
    };

    format!(
        r#"<div id="{id}" class="{class}" hx-post="{context_action}" hx-trigger="contextmenu" hx-vals='{vals}' {target}>{inner}</div>"#
    )
}

pub fn grid(game: &Game) -> String {
    let mut html = String::from(r#"<div id="grid" oncontextmenu="event.preventDefault()">"#);
    for y in 0..game.field().height() {
        html.push_str(r#"<div class="row">"#);
        for x in 0..game.field().width() {
            html.push_str(&cell(game, x, y));
        }
        html.push_str("</div>");
    }
    html.push_str("</div>");
    html
}

fn status(game: &Game) -> String {
    let field = game.field();
    let outcome = match game.status() {
        GameStatus::Playing => "",
        GameStatus::Won => " <strong>You Won!</strong>",
        GameStatus::Lost => " <strong>You Lost!</strong>",
    };
    format!(
        r#"<p class="status">{}x{} field, {} mines.{}</p>"#,
        field.width(),
        field.height(),
        field.num_mines(),
        outcome
    )
}

/// The status line and the grid, swapped as one unit when the game ends or
/// a new game starts.
pub fn game(game: &Game) -> String {
    format!(r#"<div id="game">{}{}</div>"#, status(game), grid(game))
}

fn no_game() -> String {
    r#"<div id="game"><p class="status">Start a new game.</p></div>"#.to_string()
}

fn new_game_form(params: &GameParams) -> String {
    format!(
        r##"<form hx-post="/new" hx-target="#game" hx-swap="outerHTML">
<label>Width <input type="number" name="width" min="1" value="{}"></label>
<label>Height <input type="number" name="height" min="1" value="{}"></label>
<label>Mines <input type="number" name="mines" min="0" value="{}"></label>
<button type="submit">New game</button>
</form>"##,
        params.width, params.height, params.mines
    )
}

pub fn page(current: Option<&Game>) -> String {
    let params = current
        .map(|game| GameParams {
            width: game.field().width(),
            height: game.field().height(),
            mines: game.field().num_mines() as isize,
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Minesweeper</title>
<script src="https://unpkg.com/htmx.org@1.9.12"></script>
<style>{STYLE}</style>
</head>
<body>
<h1>Minesweeper</h1>
{}
{}
</body>
</html>
"#,
        new_game_form(&params),
        current.map(game).unwrap_or_else(no_game)
    )
}

#[cfg(test)]
mod tests {
    use minesweeper_core::{Field, Pos};

    use super::*;

    fn sample() -> Game {
        Game::from_field(Field::with_mines(3, 2, &[(2, 1)]).unwrap())
    }

    #[test]
    fn grid_has_a_row_per_line() {
        let html = grid(&sample());
        assert_eq!(html.matches(r#"class="row""#).count(), 2);
        assert_eq!(html.matches(r#"class="cell hidden""#).count(), 6);
    }

    #[test]
    fn hidden_cell_posts_reveal_and_flag() {
        let html = cell(&sample(), 1, 0);
        assert!(html.contains(r#"id="cell-1-0""#));
        assert!(html.contains(r#"hx-post="/reveal""#));
        assert!(html.contains(r#"hx-post="/flag""#));
        assert!(html.contains(r#"hx-vals='{"x": 1, "y": 0}'"#));
    }

    #[test]
    fn flagged_cell_posts_unflag() {
        let mut game = sample();
        game.flag(Pos { x: 0, y: 0 }).unwrap();
        let html = cell(&game, 0, 0);
        assert!(html.contains(r#"class="cell flagged""#));
        assert!(html.contains(r#"hx-post="/unflag""#));
        assert!(!html.contains("/reveal"));
    }

    #[test]
    fn finished_game_is_inert() {
        let mut game = sample();
        game.reveal(Pos { x: 2, y: 1 }).unwrap();
        let html = self::game(&game);
        assert!(html.contains("You Lost!"));
        assert!(html.contains(r#"class="cell mine""#));
        assert!(!html.contains("hx-post"));
    }

    #[test]
    fn cell_outside_grid_is_empty() {
        assert!(cell(&sample(), 5, 5).is_empty());
    }

    #[test]
    fn page_without_game_shows_form() {
        let html = page(None);
        assert!(html.contains(r#"hx-post="/new""#));
        assert!(html.contains("Start a new game."));
        assert!(html.contains(r#"name="mines" min="0" value="10""#));
    }
}
