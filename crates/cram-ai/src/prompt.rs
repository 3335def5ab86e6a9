//! Prompt templates for the three generation tasks.

pub fn summary(text: &str) -> String {
  format!(
    "Create a comprehensive summary of the following text. Focus on key points, \
main ideas, and important details. Organise it clearly using bullet points or \
paragraphs. Write the summary in the same language as the original text.

Text to summarize:
{text}"
  )
}

pub fn quiz(text: &str, question_count: usize) -> String {
  format!(
    "Create a quiz with {question_count} multiple-choice questions based on the following text.
For each question provide:
- The question
- 4 answer options
- The correct answer (MUST be the exact full text of one of the options, not a letter)
- A brief explanation of why that answer is correct

IMPORTANT: The correctAnswer field must contain the EXACT FULL TEXT of the correct option, \
not a letter or an index.

Format your response as a JSON array with this structure:
[
  {{
    \"question\": \"Question text here?\",
    \"options\": [\"First option text\", \"Second option text\", \"Third option text\", \"Fourth option text\"],
    \"correctAnswer\": \"Second option text\",
    \"explanation\": \"Explanation here\"
  }}
]

Text for quiz:
{text}"
  )
}

pub fn flashcards(text: &str, card_count: usize) -> String {
  format!(
    "Create {card_count} flashcards based on the following text.
Each flashcard should have:
- Front: A question or term
- Back: The answer or definition

Format your response as a JSON array with this structure:
[
  {{
    \"front\": \"Question or term\",
    \"back\": \"Answer or definition\"
  }}
]

Text for flashcards:
{text}"
  )
}
