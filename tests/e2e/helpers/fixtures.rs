/// A paragraph of roughly 1,500 characters. Two of them never fit in one
/// smart fragment, so a book of `n` such paragraphs chunks into `n` fragments.
pub fn long_paragraph(number: usize) -> String {
    (1..=60)
        .map(|sentence| format!("Paragraph {} sentence {}.", number, sentence))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Book text whose fragments are exactly its paragraphs
pub fn book_with_paragraphs(count: usize) -> String {
    (1..=count)
        .map(long_paragraph)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[allow(dead_code)]
pub const SHORT_SPANISH_BOOK: &str = "En un lugar de la Mancha, de cuyo nombre no quiero acordarme, \
no ha mucho tiempo que vivía un hidalgo de los de lanza en astillero.\n\n\
Tenía en su casa una ama que pasaba de los cuarenta, y una sobrina que no llegaba a los veinte.";
