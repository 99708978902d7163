pub mod concept_chart;
pub mod concept_list;
pub mod practice_sheet;
pub mod test_transcript;
