//! 答题流程 - 流程层
//!
//! 纯函数：(当前状态, 提交的答案) → 下一个状态
//!
//! 不能回退，不能改答案，记录后即不可变

use crate::error::QuizError;
use crate::models::{Answer, QuizState};

/// 提交一道题的答案
///
/// # 参数
/// - `state`: 当前测验状态
/// - `answer`: 选项索引或跳过
///
/// # 返回
/// 新的测验状态；最后一题作答后 `is_finished == true`
pub fn submit_answer(state: &QuizState, answer: Answer) -> Result<QuizState, QuizError> {
    if state.is_finished {
        return Err(QuizError::AlreadyFinished);
    }

    let question = state
        .questions
        .get(state.current_question_index)
        .ok_or(QuizError::AlreadyFinished)?;

    if let Answer::Choice(choice) = answer {
        if choice >= question.choices.len() {
            return Err(QuizError::ChoiceOutOfRange {
                choice,
                len: question.choices.len(),
            });
        }
    }

    let mut next = state.clone();
    next.answers.push(answer);

    if question.is_correct(answer) {
        next.score += 1;
    }
    if answer == Answer::Skipped {
        next.skipped += 1;
    }

    if state.is_last_question() {
        next.is_finished = true;
    } else {
        next.current_question_index += 1;
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, Question, QuizSource};
    use chrono::Local;

    fn quiz_with(correct: &[usize]) -> QuizState {
        let questions = correct
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                Question::new(
                    format!("题目 {}", i + 1),
                    vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    c,
                )
            })
            .collect();
        QuizState::new(
            questions,
            QuizSource::Topic {
                topic: String::new(),
                difficulty: Difficulty::Medium,
            },
            Local::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_correct_then_skip_scenario() {
        let quiz = quiz_with(&[1, 0]);

        let quiz = submit_answer(&quiz, Answer::Choice(1)).unwrap();
        assert_eq!(quiz.current_question_index, 1);
        assert!(!quiz.is_finished);

        let quiz = submit_answer(&quiz, Answer::Skipped).unwrap();
        assert_eq!(quiz.score, 1);
        assert_eq!(quiz.skipped, 1);
        assert_eq!(quiz.answers, vec![Answer::Choice(1), Answer::Skipped]);
        assert!(quiz.is_finished);
        assert_eq!(quiz.current_question_index, 1);
    }

    #[test]
    fn test_skip_never_scores() {
        let quiz = quiz_with(&[0, 0, 0]);
        let next = submit_answer(&quiz, Answer::Skipped).unwrap();
        assert_eq!(next.score, 0);
        assert_eq!(next.skipped, quiz.skipped + 1);
    }

    #[test]
    fn test_mixed_answers_tally() {
        let correct = [0, 1, 2, 3, 0, 1];
        let submitted = [
            Answer::Choice(0),
            Answer::Choice(2),
            Answer::Skipped,
            Answer::Choice(3),
            Answer::Choice(1),
            Answer::Skipped,
        ];

        let mut quiz = quiz_with(&correct);
        for (i, &answer) in submitted.iter().enumerate() {
            assert_eq!(quiz.answers.len(), quiz.current_question_index);
            quiz = submit_answer(&quiz, answer).unwrap();
            assert_eq!(quiz.score + quiz.wrong() + quiz.skipped, i + 1);
        }

        let expected_score = submitted
            .iter()
            .zip(correct.iter())
            .filter(|(a, c)| **a == Answer::Choice(**c))
            .count();

        assert!(quiz.is_finished);
        assert_eq!(quiz.answers.len(), correct.len());
        assert_eq!(quiz.score, expected_score);
        assert_eq!(quiz.score, 2);
        assert_eq!(quiz.skipped, 2);
        assert_eq!(quiz.wrong(), 2);
        assert!(quiz.score + quiz.skipped <= correct.len());
    }

    #[test]
    fn test_finished_quiz_rejects_answers() {
        let quiz = quiz_with(&[0]);
        let quiz = submit_answer(&quiz, Answer::Choice(0)).unwrap();
        assert_eq!(
            submit_answer(&quiz, Answer::Choice(0)),
            Err(QuizError::AlreadyFinished)
        );
    }

    #[test]
    fn test_out_of_range_choice_leaves_state_untouched() {
        let quiz = quiz_with(&[0, 1]);
        assert_eq!(
            submit_answer(&quiz, Answer::Choice(4)),
            Err(QuizError::ChoiceOutOfRange { choice: 4, len: 4 })
        );
        assert!(quiz.answers.is_empty());
    }
}
