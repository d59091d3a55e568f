pub mod m202508060001_create_code_reviews;
