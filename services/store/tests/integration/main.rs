mod cart_test;
mod checkout_test;
mod helpers;
