// Line parsers run over plain `&str` input, so every parser here shares one
// set of bounds: a range stream of `char`s whose ranges are `&str` slices.
// `p!` declares a leaf parser; `wrapper!` declares one that wraps another parser.
macro_rules! p (
    ($name:ident() -> $ret:ty, $code:expr) => (
        combine::parser!{
            pub fn $name['a, I]()(I) -> $ret
                where [I: combine::stream::RangeStream<Range = &'a str, Token = char>]
            {
                $code
            }
        }
    );
);

macro_rules! wrapper {
    ($name:ident($delegate: ident), $code:expr) => (
        combine::parser!{
            pub fn $name['a, I, P]($delegate: P)(I) -> P::Output
                where [
                    I: combine::stream::RangeStream<Range = &'a str, Token = char>,
                    P: combine::Parser<I>,
                ]
            {
                $code
            }
        }
    );
}
