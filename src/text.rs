//! User-facing text: banner, prompt, and message rendering.
//!
//! All strings a client sees are built here so the session and play modules
//! stay free of formatting concerns. Color is ANSI; sessions write to
//! sockets, never ttys, so `main` forces colored's tty detection on (or off
//! via `--no-color`).

use crate::store::Quiz;
use colored::Colorize;

/// Connect banner
pub const BANNER: &str = r#"
  ____ ___  ____  _____     ___        _
 / ___/ _ \|  _ \| ____|   / _ \ _   _(_)____
| |  | | | | |_) |  _|    | | | | | | | |_  /
| |__| |_| |  _ <| |___   | |_| | |_| | |/ /
 \____\___/|_| \_\_____|   \__\_\\__,_|_/___|
"#;

pub fn banner() -> String {
    BANNER.replace('\n', "\r\n").yellow().to_string()
}

/// The session prompt, written without a trailing newline
pub fn prompt() -> String {
    "quiz> ".blue().to_string()
}

pub fn help() -> String {
    [
        "Comandos:",
        " h|help - Muestra esta ayuda.",
        " list - Listar los quizzes existentes.",
        " show <id> - Muestra la pregunta y la respuesta del quiz indicado.",
        " add - Añadir un nuevo quiz interactivamente.",
        " delete <id> - Borrar el quiz indicado.",
        " edit <id> - Editar el quiz indicado.",
        " test <id> - Probar el quiz indicado.",
        " p|play - Jugar a preguntar aleatoriamente todos los quizzes.",
        " credits - Créditos.",
        " q|quit - Salir del programa.",
    ]
    .join("\r\n")
}

pub fn list_entry(quiz: &Quiz) -> String {
    format!(" [{}]: {}", quiz.id.to_string().magenta(), quiz.question)
}

pub fn show_entry(quiz: &Quiz) -> String {
    format!(
        " [{}]: {} {} {}",
        quiz.id.to_string().magenta(),
        quiz.question,
        "=>".magenta(),
        quiz.answer
    )
}

pub fn ask_question() -> String {
    "Introduzca una pregunta: ".green().to_string()
}

pub fn ask_answer() -> String {
    "Introduzca la respuesta: ".green().to_string()
}

pub fn added(quiz: &Quiz) -> String {
    format!(
        " {}: {} {} {}",
        "Se ha añadido".magenta(),
        quiz.question.cyan(),
        "=>".magenta(),
        quiz.answer.cyan()
    )
}

pub fn edited(quiz: &Quiz) -> String {
    format!(
        " Se ha cambiado el quiz {} por: {} {} {}",
        quiz.id.to_string().magenta(),
        quiz.question.cyan(),
        "=>".magenta(),
        quiz.answer.cyan()
    )
}

pub fn test_question(quiz: &Quiz) -> String {
    format!("La pregunta es : {}", quiz.question)
}

/// A play round's question line
pub fn play_question(quiz: &Quiz) -> String {
    format!("{}? ", quiz.question)
}

/// Prompt used by `test` and every play round
pub fn answer_prompt() -> String {
    "Introduce la respuesta: ".to_string()
}

pub fn correct() -> String {
    format!("Su respuesta es: {}", "CORRECTA".green())
}

pub fn incorrect() -> String {
    format!("Su respuesta es: {}", "INCORRECTA".red())
}

pub fn play_empty() -> String {
    "No hay preguntas para jugar".to_string()
}

pub fn play_win() -> String {
    format!(
        "{}\r\nHas acertado todas las preguntas",
        "Enhorabuena!!!".green()
    )
}

pub fn play_tally(score: usize, total: usize) -> String {
    format!("Ha acertado: {score} de {total} preguntas")
}

pub fn play_over() -> String {
    "FIN DEL JUEGO".yellow().to_string()
}

pub fn unknown_command(token: &str) -> String {
    format!(
        "Comando desconocido: '{}'\r\nUse {} para ver todos los comandos disponibles.",
        token.red(),
        "help".green()
    )
}

pub fn missing_id() -> String {
    "Falta el parámetro id.".to_string()
}

pub fn bad_id(raw: &str) -> String {
    format!("El valor del parámetro id no es válido: {}.", raw.red())
}

pub fn not_found(id: i64) -> String {
    format!("No existe el quiz asociado al id={}.", id.to_string().red())
}

/// One user-visible error line (validation messages and the like)
pub fn error_line(message: &str) -> String {
    format!("{} {}", "Error:".red(), message)
}

pub fn catalog_error() -> String {
    error_line("no se pudo acceder al catálogo de quizzes.")
}

pub fn credits() -> String {
    [
        "Autores de la práctica:".to_string(),
        format!("\t1) {}", "Pablo Planelló San Segundo".green()),
        format!("\t2) {}", "Daniel de la Torre Lázaro".green()),
    ]
    .join("\r\n")
}

pub fn farewell() -> String {
    format!(
        "{}\r\n{}",
        "Hasta la próxima!".yellow(),
        "Espero que te haya gustado!".yellow()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(s: &str) -> String {
        // Strip ANSI escapes so assertions survive color being forced on
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\u{1b}' {
                for e in chars.by_ref() {
                    if e == 'm' {
                        break;
                    }
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_show_entry_renders_id_question_answer() {
        let quiz = Quiz {
            id: 7,
            question: "2+2?".to_string(),
            answer: "4".to_string(),
        };
        assert_eq!(plain(&show_entry(&quiz)), " [7]: 2+2? => 4");
    }

    #[test]
    fn test_tally_counts() {
        assert_eq!(play_tally(2, 5), "Ha acertado: 2 de 5 preguntas");
    }

    #[test]
    fn test_unknown_command_names_token() {
        let text = plain(&unknown_command("frobnicate"));
        assert!(text.contains("'frobnicate'"));
        assert!(text.contains("help"));
    }
}
