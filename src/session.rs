use dialoguer::Select;
use quizzify_core::{Direction, QuizNavigator, QuizQuestion};

const PREVIOUS: &str = "<< Previous question";
const NEXT: &str = "Next question >>";
const QUIT: &str = "Quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Answer(usize),
    Move(Direction),
    Quit,
}

/// Browse `navigator`'s bank question by question until the user quits.
pub fn run(mut navigator: QuizNavigator, topic: &str) -> anyhow::Result<()> {
    let total = navigator.bank().len();
    if total == 0 {
        println!("No questions could be generated for \"{topic}\".");
        return Ok(());
    }
    println!("Quiz: {topic} ({total} questions)\n");

    loop {
        let position = navigator.cursor().index % total + 1;
        let question = navigator.current()?;
        let items = menu_items(question);
        let selection = Select::new()
            .with_prompt(header(question, position, total))
            .items(&items)
            .default(0)
            .interact()?;

        match action_for(selection, question.choices.len()) {
            Action::Answer(i) => println!("{}\n", verdict(question, &items[i])),
            Action::Move(direction) => {
                navigator.step(direction)?;
            }
            Action::Quit => break,
        }
    }
    Ok(())
}

fn header(question: &QuizQuestion, position: usize, total: usize) -> String {
    format!("Question {position}/{total}: {}", question.question)
}

fn menu_items(question: &QuizQuestion) -> Vec<String> {
    question
        .choices
        .iter()
        .map(quizzify_core::Choice::label)
        .chain([PREVIOUS, NEXT, QUIT].map(String::from))
        .collect()
}

fn action_for(selection: usize, choices: usize) -> Action {
    match selection.checked_sub(choices) {
        None => Action::Answer(selection),
        Some(0) => Action::Move(Direction::Back),
        Some(1) => Action::Move(Direction::Forward),
        Some(_) => Action::Quit,
    }
}

fn verdict(question: &QuizQuestion, selected: &str) -> String {
    if question.is_correct(selected) {
        return format!("Correct! {}", question.explanation);
    }
    match question.correct_choice() {
        Some(choice) => format!(
            "Incorrect. The answer is {}. {}",
            choice.label(),
            question.explanation
        ),
        None => format!("Incorrect. {}", question.explanation),
    }
}
