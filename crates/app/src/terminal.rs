//! Line-oriented terminal front-end for a running quiz.

use std::fmt::Write as _;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

use quiz_core::summary::QuizSummary;
use services::{AnswerOutcome, QuestionView, QuizHandle, QuizUpdate, SessionError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Start,
    Retry,
    Quit,
    Answer(String),
    Invalid(String),
}

fn parse_input(line: &str, current: Option<&QuestionView>) -> Input {
    let line = line.trim();
    match line {
        "q" | "quit" => return Input::Quit,
        "r" | "retry" => return Input::Retry,
        "" if current.is_none() => return Input::Start,
        _ => {}
    }

    let Some(view) = current else {
        return Input::Invalid("press Enter to start, r to retry, or q to quit".into());
    };
    let options = view.question.options();
    match line.parse::<usize>() {
        Ok(n) if (1..=options.len()).contains(&n) => Input::Answer(options[n - 1].clone()),
        _ => Input::Invalid(format!("choose an option between 1 and {}", options.len())),
    }
}

fn render_question(view: &QuestionView) -> String {
    let (current, total) = view.progress();
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Question {current}/{total}  [{}]  {} pts    score {}  streak {}",
        view.question.category(),
        view.question.points(),
        view.score,
        view.streak
    );
    let _ = writeln!(out, "{}", view.question.prompt());
    for (i, option) in view.question.options().iter().enumerate() {
        let _ = writeln!(out, "  {}) {option}", i + 1);
    }
    let _ = write!(out, "{}s left > ", view.time_remaining);
    out
}

fn render_outcome(outcome: &AnswerOutcome) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    if outcome.score.is_correct {
        let _ = writeln!(
            out,
            "Correct! +{} (time bonus {}, streak bonus {})",
            outcome.score.points, outcome.score.time_bonus, outcome.score.streak_bonus
        );
    } else {
        let _ = writeln!(out, "Wrong. The answer was {}", outcome.correct_answer);
    }
    for badge in &outcome.new_badges {
        let _ = writeln!(out, "Badge earned: {badge}");
    }
    if let Some(score) = outcome.new_high_score {
        let _ = writeln!(out, "New high score: {score}");
    }
    let _ = write!(out, "Score {}  streak {}", outcome.total_score, outcome.streak);
    out
}

fn render_summary(summary: &QuizSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", summary.headline.message());
    let _ = writeln!(out, "Final score: {}", summary.score);
    let _ = writeln!(
        out,
        "Correct: {}/{} ({:.1}%)",
        summary.correct_count, summary.total_questions, summary.accuracy
    );
    let _ = writeln!(
        out,
        "Average time: {:.1}s ({})",
        summary.avg_response_time,
        summary.speed.label()
    );
    let _ = writeln!(
        out,
        "Best streak: {} ({})",
        summary.best_streak,
        summary.consistency.label()
    );
    let _ = writeln!(out, "Mastery: {}", summary.mastery.label());
    if !summary.badges.is_empty() {
        let badges: Vec<String> = summary.badges.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "Badges: {}", badges.join(", "));
    }
    if summary.is_new_high_score {
        let _ = writeln!(
            out,
            "New high score! (previous {})",
            summary.previous_high_score
        );
    } else {
        let _ = writeln!(out, "High score: {}", summary.previous_high_score);
    }
    let _ = write!(out, "Press r to retry or q to quit > ");
    out
}

fn render_welcome(high_score: u32) -> String {
    format!(
        "Timed quiz: 30 seconds per question.\nHigh score: {high_score}\nPress Enter to start, q to quit > "
    )
}

fn render_rejection(err: &SessionError) -> String {
    format!("\n(ignored: {err})")
}

/// Drive the quiz from stdin until the player quits or input ends.
///
/// # Errors
///
/// Returns an `io::Error` if stdout cannot be written.
pub async fn run(
    handle: &QuizHandle,
    mut updates: UnboundedReceiver<QuizUpdate>,
    high_score: u32,
) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut current: Option<QuestionView> = None;

    stdout.write_all(render_welcome(high_score).as_bytes()).await?;
    stdout.flush().await?;

    loop {
        let text = tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                match update {
                    QuizUpdate::Started(view) | QuizUpdate::Question(view) => {
                        let text = render_question(&view);
                        current = Some(view);
                        text
                    }
                    QuizUpdate::Tick { time_remaining } => {
                        if let Some(view) = current.as_mut() {
                            view.time_remaining = time_remaining;
                        }
                        if time_remaining <= 5 || time_remaining % 10 == 0 {
                            format!("\n{time_remaining}s left > ")
                        } else {
                            continue;
                        }
                    }
                    QuizUpdate::Answered(outcome) => {
                        if let Some(view) = current.as_mut() {
                            view.selected = Some(outcome.choice.clone());
                            view.correct_answer = Some(outcome.correct_answer.clone());
                        }
                        render_outcome(&outcome)
                    }
                    QuizUpdate::TimedOut { .. } => "\nTime's up!".to_string(),
                    QuizUpdate::Finished(summary) => {
                        current = None;
                        render_summary(&summary)
                    }
                    QuizUpdate::Rejected(err) => render_rejection(&err),
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let sent = match parse_input(&line, current.as_ref()) {
                    Input::Quit => break,
                    Input::Start => handle.start(),
                    Input::Retry => handle.retry(),
                    Input::Answer(choice) => handle.submit_answer(choice),
                    Input::Invalid(hint) => {
                        stdout.write_all(format!("({hint}) > ").as_bytes()).await?;
                        stdout.flush().await?;
                        continue;
                    }
                };
                if sent.is_err() {
                    break;
                }
                continue;
            }
        };

        stdout.write_all(text.as_bytes()).await?;
        stdout.flush().await?;
    }

    stdout.write_all(b"\n").await?;
    stdout.flush().await
}
