mod catalog;
mod inference;
